//! Multipart buffering for upload handlers

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use vitae_core::AppError;
use vitae_processing::{UploadForm, UploadPart};

/// Read every part of a multipart request into memory, in order.
///
/// The whole-body limit is enforced by the router's body limit layer; the
/// per-file limit is attached to the form and checked during extraction.
pub async fn read_upload_form(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::new().with_max_file_size(max_file_size);

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();
        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());

        let data = field.bytes().await.map_err(multipart_error)?;

        form.push(UploadPart {
            field: field_name,
            file_name,
            content_type,
            data,
        });
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", err.body_text()))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}
