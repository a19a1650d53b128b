//! Profile picture and photo upload handlers.
//!
//! Both handlers load the profile first so an unknown profile is rejected
//! before any upload work happens, then buffer the multipart body, extract,
//! persist into the media store and record the new photo ids on the profile.

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::read_upload_form;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use vitae_db::ProfileStore;
use vitae_processing::{extract_multiple, extract_single};

#[derive(Debug, Serialize)]
pub struct PhotosUploadResponse {
    pub photos: Vec<Uuid>,
}

/// Replace the profile picture with the first file in the picture field.
#[tracing::instrument(skip(state, multipart), fields(profile_id = %id, operation = "upload_picture"))]
pub async fn upload_picture(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let store = ProfileStore::new(&state.config, &id)?;
    let mut profile = store.get().await?;

    let form = read_upload_form(multipart, state.config.max_file_size_bytes()).await?;
    let upload = extract_single(&form, state.config.picture_field())?;
    let photo = state.pipeline.persist(&upload, &id).await?;

    profile.picture = Some(photo.id);
    let profile = store.update(profile).await?;

    tracing::info!(photo_id = %photo.id, "Profile picture updated");
    Ok(Json(profile))
}

/// Append every acceptable file in the photos field to the profile.
///
/// Unreadable or unsupported files are skipped as long as one file is
/// usable. Persisting stops at the first failure; photos stored before it
/// stay in the media store but are not linked to the profile.
#[tracing::instrument(skip(state, multipart), fields(profile_id = %id, operation = "upload_photos"))]
pub async fn upload_photos(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let store = ProfileStore::new(&state.config, &id)?;
    let mut profile = store.get().await?;

    let form = read_upload_form(multipart, state.config.max_file_size_bytes()).await?;
    let uploads = extract_multiple(&form, state.config.photos_field())?;
    let photos = state.pipeline.persist_multiple(&uploads, &id).await?;

    let ids: Vec<Uuid> = photos.iter().map(|p| p.id).collect();
    profile.photos.extend(ids.iter().copied());
    store.update(profile).await?;

    tracing::info!(count = ids.len(), "Photos added to profile");
    Ok((StatusCode::CREATED, Json(PhotosUploadResponse { photos: ids })))
}
