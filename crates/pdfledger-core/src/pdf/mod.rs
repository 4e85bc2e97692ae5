//! PDF loading module.

mod loader;

pub use loader::{encode_bytes, load_document, page_count};

use std::path::PathBuf;

/// Media type sent alongside every document.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A document read from disk and encoded for transport.
#[derive(Debug, Clone)]
pub struct EncodedDocument {
    /// Where the bytes came from.
    pub path: PathBuf,
    /// Media type of the payload.
    pub media_type: &'static str,
    /// Standard base64 encoding of the file bytes.
    pub data: String,
    /// Size of the raw file in bytes.
    pub byte_len: usize,
    /// Number of pages, when the bytes parse as a PDF.
    pub page_count: Option<u32>,
}

impl EncodedDocument {
    /// Whether there is anything to send.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
