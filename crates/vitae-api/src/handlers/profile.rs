//! Profile CRUD handlers.

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use vitae_core::{Profile, ProfileUpdate};
use vitae_db::{get_profile as load_profile, ProfileStore};

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub id: String,
    #[serde(flatten)]
    pub fields: ProfileUpdate,
}

/// Create a profile. Responds 409 when the id is already taken.
#[tracing::instrument(skip(state, request), fields(profile_id = %request.id, operation = "create_profile"))]
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateProfileRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let store = ProfileStore::new(&state.config, &request.id)?;

    let mut profile = Profile::new(request.id);
    request.fields.apply(&mut profile);

    let profile = store.create(profile).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[tracing::instrument(skip(state), fields(operation = "get_profile"))]
pub async fn get_profile(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let profile = load_profile(&state.config, &id).await?;
    Ok(Json(profile))
}

/// Apply a partial update. Fields absent from the body keep their values.
#[tracing::instrument(skip(state, update), fields(operation = "update_profile"))]
pub async fn update_profile(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(update): ValidatedJson<ProfileUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    let store = ProfileStore::new(&state.config, &id)?;

    let mut profile = store.get().await?;
    update.apply(&mut profile);

    let profile = store.update(profile).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state), fields(operation = "delete_profile"))]
pub async fn delete_profile(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    ProfileStore::new(&state.config, &id)?.delete().await?;
    Ok(StatusCode::NO_CONTENT)
}
