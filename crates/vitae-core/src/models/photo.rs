use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image formats accepted for upload, as identified by magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageKind {
    #[serde(rename = "jpg")]
    Jpeg,
    #[serde(rename = "png")]
    Png,
}

impl ImageKind {
    /// Short extension tag stored in photo metadata.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Metadata of one stored image. The re-encoded bytes live in a separate
/// bucket under the same `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ImageKind,
    /// Length of the re-encoded payload in bytes.
    pub size: u64,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_serializes_type_tag() {
        let now = Utc::now();
        let photo = Photo {
            id: Uuid::new_v4(),
            kind: ImageKind::Jpeg,
            size: 42,
            uploaded_by: "gernest".to_string(),
            uploaded_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&photo).unwrap();
        assert_eq!(value["type"], "jpg");
        assert_eq!(value["size"], 42);
        assert_eq!(value["uploaded_by"], "gernest");
    }

    #[test]
    fn test_image_kind_tags() {
        assert_eq!(ImageKind::Png.to_string(), "png");
        assert_eq!(ImageKind::Jpeg.mime_type(), "image/jpeg");
        let kind: ImageKind = serde_json::from_str("\"png\"").unwrap();
        assert_eq!(kind, ImageKind::Png);
    }
}
