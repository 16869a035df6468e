use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hushlink_db::StoreError;
use hushlink_types::api::{BlockedResponse, ErrorResponse};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("message text must not be empty")]
    EmptyMessage,

    #[error("link not found")]
    LinkNotFound,

    #[error("invalid link or secret key")]
    Unauthorized,

    /// Moderation rejected the message; the reason is shown to the sender.
    #[error("message blocked: {0}")]
    Blocked(String),

    #[error("could not allocate a link, try again")]
    Exhausted,

    #[error("internal server error")]
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized => ApiError::Unauthorized,
            StoreError::LinkNotFound(_) => ApiError::LinkNotFound,
            e @ StoreError::ShortIdExhausted { .. } => {
                error!("{}", e);
                ApiError::Exhausted
            }
            other => {
                error!("Store error: {}", other);
                ApiError::Internal
            }
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::EmptyMessage => StatusCode::BAD_REQUEST,
            ApiError::LinkNotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::Blocked(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Exhausted => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Blocked(reason) => (status, Json(BlockedResponse { reason })).into_response(),
            other => (
                status,
                Json(ErrorResponse {
                    error: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
