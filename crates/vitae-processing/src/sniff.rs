//! Content sniffing by magic bytes.
//!
//! Client-supplied file names and MIME headers are never consulted.

use image::ImageFormat;
use std::io::{self, Read, Seek, SeekFrom};
use vitae_core::ImageKind;

/// Number of leading bytes inspected.
pub const SNIFF_LEN: usize = 512;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Outcome of classifying a content prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sniffed {
    Image(ImageKind),
    /// Not an accepted image; carries the best-effort detected MIME type.
    Unsupported(String),
}

/// Classify content from its first bytes.
pub fn classify(prefix: &[u8]) -> Sniffed {
    if prefix.starts_with(JPEG_MAGIC) {
        return Sniffed::Image(ImageKind::Jpeg);
    }
    if prefix.starts_with(PNG_MAGIC) {
        return Sniffed::Image(ImageKind::Png);
    }
    Sniffed::Unsupported(detect_label(prefix))
}

fn detect_label(prefix: &[u8]) -> String {
    if let Ok(format) = image::guess_format(prefix) {
        if format != ImageFormat::Jpeg && format != ImageFormat::Png {
            return format.to_mime_type().to_string();
        }
    }
    if looks_like_text(prefix) {
        return "text/plain; charset=utf-8".to_string();
    }
    "application/octet-stream".to_string()
}

fn looks_like_text(prefix: &[u8]) -> bool {
    // A multi-byte sequence may be cut at the end of the prefix.
    let valid = match std::str::from_utf8(prefix) {
        Ok(s) => s,
        Err(e) if e.error_len().is_none() => match std::str::from_utf8(&prefix[..e.valid_up_to()]) {
            Ok(s) => s,
            Err(_) => return false,
        },
        Err(_) => return false,
    };
    valid
        .chars()
        .all(|c| !c.is_control() || c == '\n' || c == '\r' || c == '\t')
}

/// Read up to `SNIFF_LEN` bytes from the start of `reader`, then rewind it.
///
/// An empty source is an `UnexpectedEof` error.
pub fn read_prefix<R: Read + Seek>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    if filled == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "upload is empty",
        ));
    }
    buf.truncate(filled);
    reader.seek(SeekFrom::Start(0))?;
    Ok(buf)
}
