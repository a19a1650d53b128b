use bytes::Bytes;
use vitae_core::ImageKind;

/// One part of a multipart request, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub field: String,
    /// Present for file parts; plain form values have none.
    pub file_name: Option<String>,
    /// As sent by the client. Logged, never trusted.
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadPart {
    pub fn file(field: impl Into<String>, file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            field: field.into(),
            file_name: Some(file_name.into()),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn value(field: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            field: field.into(),
            file_name: None,
            content_type: None,
            data: value.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_file(&self) -> bool {
        self.file_name.is_some()
    }
}

/// A parsed multipart request, parts in the order they were sent.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    parts: Vec<UploadPart>,
    max_file_size: Option<usize>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-file size limit checked during extraction.
    pub fn with_max_file_size(mut self, max: usize) -> Self {
        self.max_file_size = Some(max);
        self
    }

    pub fn push(&mut self, part: UploadPart) {
        self.parts.push(part);
    }

    pub fn with_part(mut self, part: UploadPart) -> Self {
        self.push(part);
        self
    }

    pub fn max_file_size(&self) -> Option<usize> {
        self.max_file_size
    }

    /// File parts submitted under `field`, in request order.
    pub fn files<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a UploadPart> + 'a {
        self.parts
            .iter()
            .filter(move |part| part.is_file() && part.field == field)
    }
}

/// An uploaded file that passed sniffing, ready for persistence.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub kind: ImageKind,
    /// Client-supplied name, for logging only.
    pub file_name: Option<String>,
    data: Bytes,
}

impl FileUpload {
    pub(crate) fn new(kind: ImageKind, file_name: Option<String>, data: Bytes) -> Self {
        Self {
            kind,
            file_name,
            data,
        }
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
