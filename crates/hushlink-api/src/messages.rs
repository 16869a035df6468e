use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use hushlink_ai::{moderate_content, summarize_messages};
use hushlink_db::{StoreError, links, messages};
use hushlink_types::api::{MessageResponse, OwnerQuery, SendMessageRequest, SummaryResponse};

use crate::ApiError;
use crate::state::{AppState, with_store};

/// POST /links/{short_id}/messages — screen, then store an anonymous message.
///
/// Blocked messages are never stored; the sender gets the reason back.
pub async fn send_message(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    let link = with_store(&state, move |store| links::get_link(store, &short_id))
        .await?
        .ok_or(ApiError::LinkNotFound)?;

    let verdict = moderate_content(&state.model, &req.text).await;
    if !verdict.is_safe {
        info!("Blocked message for link {}", link.short_id);
        return Err(ApiError::Blocked(verdict.reason));
    }

    let link_id = link.id;
    let stored = with_store(&state, move |store| {
        messages::add_message(store, link_id, &req.text, Some(true), Some(verdict.reason.as_str()))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(stored))))
}

/// GET /links/{short_id}/messages?secret= — owner view, newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let secret = query.secret.ok_or(ApiError::Unauthorized)?;

    let rows = with_store(&state, move |store| {
        let link = links::authorize(store, &short_id, &secret)?;
        messages::get_messages(store, link.id)
    })
    .await?;

    let out: Vec<MessageResponse> = rows.into_iter().map(MessageResponse::from).collect();
    Ok(Json(out))
}

/// DELETE /links/{short_id}/messages/{message_id}?secret=
pub async fn delete_message(
    State(state): State<AppState>,
    Path((short_id, message_id)): Path<(String, Uuid)>,
    Query(query): Query<OwnerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let secret = query.secret.ok_or(ApiError::Unauthorized)?;

    with_store(&state, move |store| {
        let link = links::get_link(store, &short_id)?.ok_or(StoreError::Unauthorized)?;
        messages::delete_message(store, message_id, link.id, &secret)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /links/{short_id}/summary?secret= — digest of the link's messages.
pub async fn summarize(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let secret = query.secret.ok_or(ApiError::Unauthorized)?;

    let texts: Vec<String> = with_store(&state, move |store| {
        let link = links::authorize(store, &short_id, &secret)?;
        messages::get_messages(store, link.id)
    })
    .await?
    .into_iter()
    .map(|m| m.text)
    .collect();

    let summary = summarize_messages(&state.model, &texts).await;
    Ok(Json(SummaryResponse { summary }))
}
