//! Photo ingestion: extract uploaded files from a buffered multipart form,
//! identify them by magic bytes, re-encode them and persist each one as a
//! metadata/data pair sharing a generated id.

pub mod codec;
pub mod error;
pub mod pipeline;
pub mod sniff;
pub mod upload;

pub use error::MediaError;
pub use pipeline::MediaPipeline;
pub use sniff::{classify, read_prefix, Sniffed, SNIFF_LEN};
pub use upload::{extract_each, extract_multiple, extract_single, FileUpload, UploadForm, UploadPart};
