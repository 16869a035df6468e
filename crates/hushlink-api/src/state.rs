use std::sync::Arc;

use hushlink_ai::GeminiClient;
use hushlink_db::{Store, StoreError};
use tracing::error;

use crate::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn Store>,
    pub model: GeminiClient,
    /// Origin used to build shareable URLs, without a trailing slash.
    pub public_url: String,
}

impl AppStateInner {
    pub fn send_url(&self, short_id: &str) -> String {
        format!("{}/s/{}", self.public_url, short_id)
    }

    pub fn view_url(&self, short_id: &str, secret_key: &str) -> String {
        format!("{}/v/{}?secret={}", self.public_url, short_id, secret_key)
    }
}

/// Run a blocking store call off the async runtime.
pub(crate) async fn with_store<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn Store) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(state.store.as_ref()))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}
