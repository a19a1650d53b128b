//! Buffered multipart form model and file extraction.

mod extract;
mod form;

pub use extract::{extract_each, extract_multiple, extract_single};
pub use form::{FileUpload, UploadForm, UploadPart};
