use super::form::{FileUpload, UploadForm, UploadPart};
use crate::error::MediaError;
use crate::sniff::{classify, read_prefix, Sniffed};

/// Extract the first file submitted under `field`.
pub fn extract_single(form: &UploadForm, field: &str) -> Result<FileUpload, MediaError> {
    let part = form
        .files(field)
        .next()
        .ok_or_else(|| MediaError::MissingFile(field.to_string()))?;
    open_part(part, form.max_file_size())
}

/// Extract every file submitted under `field`, one result per file in
/// request order. An empty vector means no file was submitted.
pub fn extract_each(form: &UploadForm, field: &str) -> Vec<Result<FileUpload, MediaError>> {
    form.files(field)
        .map(|part| open_part(part, form.max_file_size()))
        .collect()
}

/// Extract every acceptable file submitted under `field`.
///
/// Files that fail to open or sniff are skipped and logged. When nothing
/// succeeds the error of the last failing file is returned, or `MissingFile`
/// when no file was submitted at all.
pub fn extract_multiple(form: &UploadForm, field: &str) -> Result<Vec<FileUpload>, MediaError> {
    let mut uploads = Vec::new();
    let mut last_error = None;

    for (part, result) in form.files(field).zip(extract_each(form, field)) {
        match result {
            Ok(upload) => uploads.push(upload),
            Err(e) => {
                tracing::warn!(
                    field = %field,
                    file_name = part.file_name.as_deref().unwrap_or(""),
                    error = %e,
                    "Skipping uploaded file"
                );
                last_error = Some(e);
            }
        }
    }

    if !uploads.is_empty() {
        return Ok(uploads);
    }

    Err(last_error.unwrap_or_else(|| MediaError::MissingFile(field.to_string())))
}

fn open_part(part: &UploadPart, max_file_size: Option<usize>) -> Result<FileUpload, MediaError> {
    if let Some(max) = max_file_size {
        if part.data.len() > max {
            return Err(MediaError::FileTooLarge {
                size: part.data.len(),
                max,
            });
        }
    }

    let mut reader = std::io::Cursor::new(part.data.clone());
    let prefix = read_prefix(&mut reader)?;

    match classify(&prefix) {
        Sniffed::Image(kind) => {
            tracing::debug!(
                field = %part.field,
                file_name = part.file_name.as_deref().unwrap_or(""),
                declared_type = part.content_type.as_deref().unwrap_or(""),
                kind = %kind,
                size_bytes = part.data.len(),
                "Upload identified"
            );
            Ok(FileUpload::new(kind, part.file_name.clone(), reader.into_inner()))
        }
        Sniffed::Unsupported(label) => Err(MediaError::UnsupportedType(label)),
    }
}
