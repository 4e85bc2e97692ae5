//! Error types for the pdfledger-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the pdfledger library.
#[derive(Error, Debug)]
pub enum Error {
    /// The input document could not be loaded.
    #[error("{0}")]
    Load(#[from] LoadError),

    /// The extraction service failed or could not be reached.
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    /// The service reply could not be normalized.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// The document store rejected an operation.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The tabular export failed.
    #[error("{0}")]
    Export(#[from] ExportError),

    /// Configuration error.
    #[error("{0}")]
    Config(String),
}

/// Coarse failure buckets reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or unreadable input file.
    Input,
    /// Credential, API or response failure of the upstream service.
    Service,
    /// Unusable response text.
    Parse,
    /// Store or export failure.
    Sink,
    /// Invalid configuration.
    Config,
}

impl ErrorCategory {
    /// Human-readable label used in error banners.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::Input => "Input",
            ErrorCategory::Service => "Service",
            ErrorCategory::Parse => "Parse",
            ErrorCategory::Sink => "Sink",
            ErrorCategory::Config => "Configuration",
        }
    }
}

impl Error {
    /// The failure bucket this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Load(_) => ErrorCategory::Input,
            Error::Extraction(_) => ErrorCategory::Service,
            Error::Parse(_) => ErrorCategory::Parse,
            Error::Store(_) | Error::Export(_) => ErrorCategory::Sink,
            Error::Config(_) => ErrorCategory::Config,
        }
    }

    /// Whether this is a duplicate natural key rejection from the store.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::Store(StoreError::Duplicate(_)))
    }
}

/// Errors related to loading input documents.
#[derive(Error, Debug)]
pub enum LoadError {
    /// No file exists at the given path.
    #[error("file not found at {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reported by the extraction service client.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No API credential was configured.
    #[error("no API key configured (set ANTHROPIC_API_KEY)")]
    MissingCredential,

    /// The client could not be configured.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// The document to send was empty.
    #[error("no document data provided")]
    NoInput,

    /// The service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request could not be sent or the reply could not be read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The reply carried no text.
    #[error("service returned an empty response")]
    EmptyResponse,
}

/// Errors related to normalizing the service reply.
#[derive(Error, Debug)]
pub enum ParseError {
    /// There was no text to parse.
    #[error("no response text to parse")]
    Empty,

    /// The text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON has the wrong top-level shape.
    #[error("malformed structure: expected {expected}, found {found}")]
    MalformedStructure {
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors raised by the invoice document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An invoice with this number is already stored.
    #[error("invoice {0} already exists in database")]
    Duplicate(String),

    /// The invoice carries no invoice number to key on.
    #[error("invoice has no invoice number")]
    MissingKey,

    /// The update patch is not a JSON object.
    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    /// A stored document could not be (de)serialized.
    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The database directory could not be prepared.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the CSV export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// There were no rows to write.
    #[error("no transactions to save")]
    Empty,

    /// CSV encoding or write failure.
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error while flushing the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the pdfledger library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err: Error = LoadError::NotFound(PathBuf::from("a.pdf")).into();
        assert_eq!(err.category(), ErrorCategory::Input);

        let err: Error = ExtractionError::MissingCredential.into();
        assert_eq!(err.category(), ErrorCategory::Service);

        let err: Error = ParseError::Empty.into();
        assert_eq!(err.category(), ErrorCategory::Parse);

        let err: Error = ExportError::Empty.into();
        assert_eq!(err.category(), ErrorCategory::Sink);
    }

    #[test]
    fn test_duplicate_detection() {
        let err: Error = StoreError::Duplicate("INV-1".to_string()).into();
        assert!(err.is_duplicate());
        assert_eq!(err.to_string(), "invoice INV-1 already exists in database");
        assert!(!Error::from(StoreError::MissingKey).is_duplicate());
    }
}
