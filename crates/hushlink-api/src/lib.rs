pub mod error;
pub mod links;
pub mod messages;
pub mod state;
pub mod trace;

use axum::{
    Router,
    routing::{delete, get, post},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};
pub use trace::trace_layer;

/// All HTTP routes. Middleware layers are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/links", post(links::create_link))
        .route("/links/{short_id}", get(links::get_link))
        .route(
            "/links/{short_id}/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route(
            "/links/{short_id}/messages/{message_id}",
            delete(messages::delete_message),
        )
        .route("/links/{short_id}/summary", post(messages::summarize))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
