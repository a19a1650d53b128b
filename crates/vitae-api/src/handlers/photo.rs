use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(skip(state), fields(photo_id = %id, operation = "get_photo"))]
pub async fn get_photo(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let photo = state.photos.get_photo(id).await?;
    Ok(Json(photo))
}

/// Serve the stored (re-encoded) bytes with the content type of their kind.
#[tracing::instrument(skip(state), fields(photo_id = %id, operation = "download_photo"))]
pub async fn download_photo(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (photo, data) = state.photos.get_photo_data(id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, photo.kind.mime_type().to_string()),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        data,
    ))
}
