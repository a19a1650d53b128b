use crate::codec::{reencode_blocking, DEFAULT_JPEG_QUALITY};
use crate::error::MediaError;
use crate::upload::FileUpload;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;
use vitae_core::{Config, Photo};
use vitae_storage::{BatchEntry, KeyedStore};

/// Persists extracted uploads into the shared media database.
///
/// Each photo becomes two entries under the same generated id: JSON metadata
/// in the metadata bucket and the re-encoded bytes in the data bucket. Both
/// are written with one `create_batch`, so on a transactional store a failed
/// data write leaves nothing behind. On the filesystem store the metadata
/// entry may remain without its data.
#[derive(Clone)]
pub struct MediaPipeline {
    store: Arc<dyn KeyedStore>,
    meta_bucket: String,
    data_bucket: String,
    jpeg_quality: u8,
}

impl MediaPipeline {
    pub fn new(
        store: Arc<dyn KeyedStore>,
        meta_bucket: impl Into<String>,
        data_bucket: impl Into<String>,
    ) -> Self {
        Self {
            store,
            meta_bucket: meta_bucket.into(),
            data_bucket: data_bucket.into(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn from_config(store: Arc<dyn KeyedStore>, config: &Config) -> Self {
        Self::new(store, config.media_meta_bucket(), config.media_data_bucket())
            .with_jpeg_quality(config.jpeg_quality())
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Re-encode one upload and store its metadata and data.
    #[tracing::instrument(
        skip(self, upload),
        fields(profile_id = %profile_id, kind = %upload.kind, photo_id = tracing::field::Empty)
    )]
    pub async fn persist(&self, upload: &FileUpload, profile_id: &str) -> Result<Photo, MediaError> {
        let start = Instant::now();

        let encoded = reencode_blocking(upload.kind, upload.data().clone(), self.jpeg_quality).await?;

        let now = Utc::now();
        let photo = Photo {
            id: Uuid::new_v4(),
            kind: upload.kind,
            size: encoded.len() as u64,
            uploaded_by: profile_id.to_string(),
            uploaded_at: now,
            updated_at: now,
        };
        tracing::Span::current().record("photo_id", tracing::field::display(photo.id));

        let meta = serde_json::to_vec(&photo).map_err(MediaError::Encoding)?;
        let key = photo.id.to_string();

        let entries = [
            BatchEntry::new(&self.meta_bucket, &key, &meta),
            BatchEntry::new(&self.data_bucket, &key, &encoded),
        ];
        if let Err(e) = self.store.create_batch(&entries).await {
            tracing::error!(
                error = %e,
                transactional = self.store.supports_transactions(),
                "Failed to store photo"
            );
            return Err(e.into());
        }

        tracing::info!(
            file_name = upload.file_name.as_deref().unwrap_or(""),
            original_size_bytes = upload.len(),
            size_bytes = photo.size,
            duration_ms = start.elapsed().as_millis() as u64,
            "Photo persisted"
        );

        Ok(photo)
    }

    /// Persist uploads in order, stopping at the first failure. Photos stored
    /// before the failure stay stored.
    pub async fn persist_multiple(
        &self,
        uploads: &[FileUpload],
        profile_id: &str,
    ) -> Result<Vec<Photo>, MediaError> {
        let mut photos = Vec::with_capacity(uploads.len());
        for (index, upload) in uploads.iter().enumerate() {
            match self.persist(upload, profile_id).await {
                Ok(photo) => photos.push(photo),
                Err(e) => {
                    tracing::warn!(
                        index,
                        persisted = photos.len(),
                        remaining = uploads.len() - index,
                        error = %e,
                        "Stopping batch persist"
                    );
                    return Err(e);
                }
            }
        }
        Ok(photos)
    }
}
