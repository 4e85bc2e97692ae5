//! Extraction service client module.

mod anthropic;
pub mod prompts;

pub use anthropic::AnthropicClient;

use async_trait::async_trait;

use crate::error::ExtractionError;
use crate::pdf::EncodedDocument;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Kind of document being extracted; selects the instruction template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Advertising invoice, answered with a single JSON object.
    Invoice,
    /// Bank statement, answered with a JSON array of transactions.
    Statement,
}

impl DocumentKind {
    /// The fixed extraction instruction for this kind of document.
    pub fn instruction(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => prompts::INVOICE_INSTRUCTION,
            DocumentKind::Statement => prompts::STATEMENT_INSTRUCTION,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Invoice => write!(f, "invoice"),
            DocumentKind::Statement => write!(f, "statement"),
        }
    }
}

/// Trait for generative model clients.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a document plus instruction and return the raw reply text.
    async fn complete(&self, document: &EncodedDocument, instruction: &str) -> Result<String>;
}
