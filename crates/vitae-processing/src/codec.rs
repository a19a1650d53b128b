//! Decode and re-encode accepted images.
//!
//! Stored bytes are always the re-encoded form: JPEG at the configured
//! quality, PNG with the encoder's default settings.

use crate::error::MediaError;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat};
use vitae_core::ImageKind;

pub const DEFAULT_JPEG_QUALITY: u8 = 98;

/// Decode `data` as `kind` and encode it again.
pub fn reencode(kind: ImageKind, data: &[u8], jpeg_quality: u8) -> Result<Vec<u8>, MediaError> {
    let format = match kind {
        ImageKind::Jpeg => ImageFormat::Jpeg,
        ImageKind::Png => ImageFormat::Png,
    };
    let img = image::load_from_memory_with_format(data, format)
        .map_err(|source| MediaError::Decode { kind, source })?;

    let mut out = Vec::with_capacity(data.len());
    let encoded = match kind {
        ImageKind::Jpeg => {
            // JPEG has no alpha channel and no 16-bit samples.
            let img = match img {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            };
            img.write_with_encoder(JpegEncoder::new_with_quality(&mut out, jpeg_quality))
        }
        ImageKind::Png => img.write_with_encoder(PngEncoder::new(&mut out)),
    };
    encoded.map_err(|source| MediaError::Encode { kind, source })?;

    Ok(out)
}

/// `reencode` on the blocking thread pool.
pub async fn reencode_blocking(
    kind: ImageKind,
    data: Bytes,
    jpeg_quality: u8,
) -> Result<Vec<u8>, MediaError> {
    tokio::task::spawn_blocking(move || reencode(kind, &data, jpeg_quality)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{corrupt_png_bytes, jpeg_bytes, png_bytes};
    use image::GenericImageView;

    #[test]
    fn test_reencode_jpeg_stays_jpeg() {
        let out = reencode(ImageKind::Jpeg, &jpeg_bytes(), DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);

        let img = image::load_from_memory_with_format(&out, ImageFormat::Jpeg).unwrap();
        assert_eq!(img.dimensions(), (16, 12));
    }

    #[test]
    fn test_reencode_png_is_lossless() {
        let original = image::load_from_memory(&png_bytes()).unwrap();
        let out = reencode(ImageKind::Png, &png_bytes(), DEFAULT_JPEG_QUALITY).unwrap();
        let decoded = image::load_from_memory_with_format(&out, ImageFormat::Png).unwrap();

        assert_eq!(decoded.to_rgba8(), original.to_rgba8());
    }

    #[test]
    fn test_corrupt_image_is_decode_error() {
        let err = reencode(ImageKind::Png, &corrupt_png_bytes(), DEFAULT_JPEG_QUALITY).unwrap_err();
        assert!(matches!(err, MediaError::Decode { kind: ImageKind::Png, .. }));
    }

    #[test]
    fn test_mismatched_kind_is_decode_error() {
        let err = reencode(ImageKind::Jpeg, &png_bytes(), DEFAULT_JPEG_QUALITY).unwrap_err();
        assert!(matches!(err, MediaError::Decode { kind: ImageKind::Jpeg, .. }));
    }

    #[tokio::test]
    async fn test_reencode_blocking() {
        let out = reencode_blocking(ImageKind::Png, Bytes::from(png_bytes()), 90)
            .await
            .unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
    }
}
