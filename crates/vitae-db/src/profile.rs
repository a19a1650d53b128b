use chrono::{Duration, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use vitae_core::{AppError, Config, Profile, StoreBackend};
use vitae_storage::{open_store, KeyedStore, OpenMode, StoreError};

const MAX_PROFILE_ID_LEN: usize = 128;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Profile already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid profile id: {0}")]
    InvalidId(String),

    #[error("Failed to encode profile: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("Failed to decode profile: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("Profile storage error: {0}")]
    Storage(#[source] StoreError),
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(id) => AppError::NotFound(format!("Profile '{}' not found", id)),
            ProfileError::AlreadyExists(id) => {
                AppError::Conflict(format!("Profile '{}' already exists", id))
            }
            ProfileError::InvalidId(msg) => AppError::InvalidInput(msg),
            ProfileError::Encoding(e) => AppError::Internal(format!("Failed to encode profile: {}", e)),
            ProfileError::Decoding(e) => AppError::Internal(format!("Failed to decode profile: {}", e)),
            ProfileError::Storage(e) => AppError::Storage(e.to_string()),
        }
    }
}

/// Profile ids double as database file names, so only `[A-Za-z0-9_-]` is allowed.
pub fn validate_profile_id(id: &str) -> Result<(), ProfileError> {
    if id.is_empty() || id.len() > MAX_PROFILE_ID_LEN {
        return Err(ProfileError::InvalidId(format!(
            "profile id must be 1 to {} characters",
            MAX_PROFILE_ID_LEN
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ProfileError::InvalidId(format!(
            "profile id '{}' may only contain letters, digits, '-' and '_'",
            id
        )));
    }
    Ok(())
}

/// CRUD for a single profile record.
///
/// The store is scoped to one profile id at construction. Each operation opens
/// the profile's database, performs one keyed operation and closes it again;
/// reads never create a database. Concurrent updates are last-write-wins.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    id: String,
    path: PathBuf,
    backend: StoreBackend,
}

impl ProfileStore {
    pub fn new(config: &Config, id: &str) -> Result<Self, ProfileError> {
        validate_profile_id(id)?;

        let path = config.profile_db_path(id);
        if path == config.media_db_path() {
            return Err(ProfileError::InvalidId(format!(
                "profile id '{}' resolves to the media database",
                id
            )));
        }

        Ok(Self {
            id: id.to_string(),
            path,
            backend: config.store_backend(),
        })
    }

    /// Location of this profile's database.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a new profile, stamping `created_at` (and `updated_at`) with the
    /// current time. An existing record is never overwritten.
    #[tracing::instrument(skip(self, profile), fields(db.bucket = %self.id, db.operation = "insert"))]
    pub async fn create(&self, mut profile: Profile) -> Result<Profile, ProfileError> {
        self.ensure_same_id(&profile)?;

        let now = Utc::now();
        profile.created_at = now;
        profile.updated_at = now;

        let bytes = serde_json::to_vec(&profile).map_err(ProfileError::Encoding)?;

        let store = self.open(OpenMode::CreateIfMissing).await?;
        let result = store.create(&self.id, &self.id, &bytes).await;
        store.close().await;
        result.map_err(|e| self.map_store_error(e))?;

        tracing::info!(profile_id = %self.id, "Profile created");
        Ok(profile)
    }

    /// Load the profile. A missing database or record is `NotFound`.
    #[tracing::instrument(skip(self), fields(db.bucket = %self.id, db.operation = "select"))]
    pub async fn get(&self) -> Result<Profile, ProfileError> {
        let store = self.open(OpenMode::MustExist).await?;
        let result = store.get(&self.id, &self.id).await;
        store.close().await;
        let bytes = result.map_err(|e| self.map_store_error(e))?;

        serde_json::from_slice(&bytes).map_err(ProfileError::Decoding)
    }

    /// Overwrite an existing profile, stamping `updated_at`.
    ///
    /// The new `updated_at` is always strictly later than the one carried in
    /// `profile`, even when the clock has not advanced.
    #[tracing::instrument(skip(self, profile), fields(db.bucket = %self.id, db.operation = "update"))]
    pub async fn update(&self, mut profile: Profile) -> Result<Profile, ProfileError> {
        self.ensure_same_id(&profile)?;

        let now = Utc::now();
        profile.updated_at = if now > profile.updated_at {
            now
        } else {
            profile.updated_at + Duration::microseconds(1)
        };

        let bytes = serde_json::to_vec(&profile).map_err(ProfileError::Encoding)?;

        let store = self.open(OpenMode::MustExist).await?;
        let result = store.update(&self.id, &self.id, &bytes).await;
        store.close().await;
        result.map_err(|e| self.map_store_error(e))?;

        tracing::info!(profile_id = %self.id, "Profile updated");
        Ok(profile)
    }

    /// Remove the profile record. Deleting an absent profile succeeds.
    #[tracing::instrument(skip(self), fields(db.bucket = %self.id, db.operation = "delete"))]
    pub async fn delete(&self) -> Result<(), ProfileError> {
        let store = match self.open(OpenMode::MustExist).await {
            Ok(store) => store,
            Err(ProfileError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        };
        let result = store.delete(&self.id, &self.id).await;
        store.close().await;
        result.map_err(|e| self.map_store_error(e))?;

        tracing::info!(profile_id = %self.id, "Profile deleted");
        Ok(())
    }

    async fn open(&self, mode: OpenMode) -> Result<Arc<dyn KeyedStore>, ProfileError> {
        open_store(self.backend, &self.path, mode)
            .await
            .map_err(|e| self.map_store_error(e))
    }

    fn ensure_same_id(&self, profile: &Profile) -> Result<(), ProfileError> {
        if profile.id != self.id {
            return Err(ProfileError::InvalidId(format!(
                "profile id '{}' does not match store '{}'",
                profile.id, self.id
            )));
        }
        Ok(())
    }

    fn map_store_error(&self, err: StoreError) -> ProfileError {
        match err {
            StoreError::NotFound(_) | StoreError::DatabaseNotFound(_) => {
                ProfileError::NotFound(self.id.clone())
            }
            StoreError::AlreadyExists(_) => ProfileError::AlreadyExists(self.id.clone()),
            other => ProfileError::Storage(other),
        }
    }
}

/// Construct a store scoped to `id` and read its profile.
pub async fn get_profile(config: &Config, id: &str) -> Result<Profile, ProfileError> {
    ProfileStore::new(config, id)?.get().await
}
