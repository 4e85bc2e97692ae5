//! Read PDFs from disk and base64-encode them using lopdf for a page count.

use std::io::ErrorKind;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lopdf::Document;
use tracing::{debug, warn};

use super::{EncodedDocument, PDF_MEDIA_TYPE};
use crate::error::LoadError;

/// Read a file and encode it for the extraction service.
///
/// A missing file is reported as [`LoadError::NotFound`]; any other read
/// failure as [`LoadError::Io`].
pub fn load_document(path: &Path) -> Result<EncodedDocument, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let page_count = page_count(&bytes);
    match page_count {
        Some(pages) => debug!("Loaded {} ({} bytes, {} pages)", path.display(), bytes.len(), pages),
        None => warn!("{} does not parse as a PDF, sending it anyway", path.display()),
    }

    Ok(EncodedDocument {
        path: path.to_path_buf(),
        media_type: PDF_MEDIA_TYPE,
        data: encode_bytes(&bytes),
        byte_len: bytes.len(),
        page_count,
    })
}

/// Standard, padded base64.
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Count pages if the bytes are a readable PDF.
pub fn page_count(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() {
        return None;
    }
    Document::load_mem(bytes)
        .ok()
        .map(|doc| doc.get_pages().len() as u32)
}
