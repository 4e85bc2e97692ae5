//! Core library for LLM-backed PDF ledger extraction.
//!
//! This crate provides:
//! - PDF loading and base64 encoding for upload
//! - An Anthropic Messages API client behind the `CompletionClient` trait
//! - Normalization of loosely-typed model output into typed records
//! - Invoice storage (SQLite) and bank statement export (CSV)
//! - A single-file pipeline tying the stages together

pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod pdf;
pub mod pipeline;
pub mod sink;

pub use error::{Error, ErrorCategory, Result};
pub use extract::{AnthropicClient, CompletionClient, DocumentKind};
pub use models::config::AppConfig;
pub use models::invoice::{Campaign, FunnelStage, InvoiceDetails, InvoiceRecord, LineItem};
pub use models::transaction::Transaction;
pub use normalize::{Normalized, normalize_invoice, normalize_transactions};
pub use pdf::{EncodedDocument, load_document};
pub use pipeline::{InvoiceSummary, Pipeline, StatementSummary};
pub use sink::{CsvExport, InvoiceStore, RecordSink, StoredInvoice};
