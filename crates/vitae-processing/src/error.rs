use std::io;
use vitae_core::{AppError, ImageKind};
use vitae_storage::StoreError;

/// Errors from photo extraction and persistence.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("No file uploaded under field '{0}'")]
    MissingFile(String),

    #[error("File type {0} not supported")]
    UnsupportedType(String),

    #[error("Failed to read upload: {0}")]
    Io(#[from] io::Error),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Failed to decode {kind} image: {source}")]
    Decode {
        kind: ImageKind,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode {kind} image: {source}")]
    Encode {
        kind: ImageKind,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode photo metadata: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("Photo storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Image task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::MissingFile(field) => {
                AppError::MissingFile(format!("No file uploaded under field '{}'", field))
            }
            MediaError::UnsupportedType(label) => {
                AppError::UnsupportedMediaType(format!("File type {} not supported", label))
            }
            MediaError::Io(e) => AppError::InvalidInput(format!("Failed to read upload: {}", e)),
            e @ MediaError::FileTooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
            e @ (MediaError::Decode { .. } | MediaError::Encode { .. }) => {
                AppError::ImageProcessing(e.to_string())
            }
            MediaError::Storage(e) => e.into(),
            e @ (MediaError::Encoding(_) | MediaError::Task(_)) => AppError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitae_core::ErrorMetadata;

    #[test]
    fn test_upload_errors_map_to_client_errors() {
        let err: AppError = MediaError::MissingFile("photos".to_string()).into();
        assert_eq!(err.http_status_code(), 400);
        assert!(err.client_message().contains("photos"));

        let err: AppError = MediaError::UnsupportedType("text/plain; charset=utf-8".to_string()).into();
        assert_eq!(err.http_status_code(), 415);

        let err: AppError = MediaError::FileTooLarge { size: 20, max: 10 }.into();
        assert_eq!(err.http_status_code(), 413);

        let err: AppError = MediaError::Io(io::Error::from(io::ErrorKind::UnexpectedEof)).into();
        assert_eq!(err.http_status_code(), 400);
    }
}
