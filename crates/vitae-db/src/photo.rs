use std::sync::Arc;
use uuid::Uuid;
use vitae_core::{AppError, Photo};
use vitae_storage::{KeyedStore, StoreError};

/// Read access to stored photos in the shared media database.
#[derive(Clone)]
pub struct PhotoRepository {
    store: Arc<dyn KeyedStore>,
    meta_bucket: String,
    data_bucket: String,
}

impl PhotoRepository {
    pub fn new(
        store: Arc<dyn KeyedStore>,
        meta_bucket: impl Into<String>,
        data_bucket: impl Into<String>,
    ) -> Self {
        Self {
            store,
            meta_bucket: meta_bucket.into(),
            data_bucket: data_bucket.into(),
        }
    }

    /// Get photo metadata by ID
    #[tracing::instrument(skip(self), fields(db.bucket = %self.meta_bucket, db.record_id = %id))]
    pub async fn get_photo(&self, id: Uuid) -> Result<Photo, AppError> {
        let key = id.to_string();
        let bytes = self
            .store
            .get(&self.meta_bucket, &key)
            .await
            .map_err(|e| not_found_or_storage(e, id))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Internal(format!("Failed to decode photo {}: {}", id, e)))
    }

    /// Get photo metadata together with its re-encoded bytes.
    ///
    /// Metadata without a data entry (a partially persisted upload) is
    /// reported as not found.
    #[tracing::instrument(skip(self), fields(db.bucket = %self.data_bucket, db.record_id = %id))]
    pub async fn get_photo_data(&self, id: Uuid) -> Result<(Photo, Vec<u8>), AppError> {
        let photo = self.get_photo(id).await?;

        let data = self
            .store
            .get(&self.data_bucket, &id.to_string())
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    tracing::warn!(photo_id = %id, "Photo metadata has no data entry");
                }
                not_found_or_storage(e, id)
            })?;

        Ok((photo, data))
    }
}

fn not_found_or_storage(err: StoreError, id: Uuid) -> AppError {
    if err.is_not_found() {
        AppError::NotFound(format!("Photo '{}' not found", id))
    } else {
        err.into()
    }
}
