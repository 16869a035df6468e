use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use hushlink_db::links;
use hushlink_types::api::{CreateLinkResponse, LinkInfoResponse};

use crate::ApiError;
use crate::state::{AppState, with_store};

/// POST /links — mint a new link. The secret only ever leaves the server here.
pub async fn create_link(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let link = with_store(&state, |store| links::create_link(store)).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse {
            send_url: state.send_url(&link.short_id),
            view_url: state.view_url(&link.short_id, &link.secret_key),
            short_id: link.short_id,
            secret_key: link.secret_key,
            created_at: link.created_at,
        }),
    ))
}

/// GET /links/{short_id} — lets a sender check the link before writing.
pub async fn get_link(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let link = with_store(&state, move |store| links::get_link(store, &short_id))
        .await?
        .ok_or(ApiError::LinkNotFound)?;

    Ok(Json(LinkInfoResponse {
        short_id: link.short_id,
        created_at: link.created_at,
    }))
}
