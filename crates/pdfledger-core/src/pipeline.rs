//! Single-file orchestration: load, extract, normalize, sink.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::extract::{CompletionClient, DocumentKind};
use crate::models::invoice::InvoiceRecord;
use crate::models::transaction::Transaction;
use crate::normalize::{Normalized, normalize_invoice, normalize_transactions};
use crate::pdf::{EncodedDocument, load_document};
use crate::sink::RecordSink;

/// Outcome of a stored invoice.
#[derive(Debug, Clone)]
pub struct InvoiceSummary {
    pub issuer: String,
    pub number: String,
    pub date: String,
    pub total: f64,
    pub item_count: usize,
    /// Fields filled with defaults during normalization.
    pub defaulted_fields: Vec<String>,
    /// Consistency issues found on the stored invoice.
    pub issues: Vec<String>,
    /// Where the invoice was stored.
    pub destination: String,
}

/// Outcome of an exported statement.
#[derive(Debug, Clone)]
pub struct StatementSummary {
    /// Number of rows written.
    pub rows: usize,
    /// Rows with at least one defaulted field.
    pub defaulted_rows: usize,
    /// Where the rows were written.
    pub destination: String,
    /// The exported transactions, in statement order.
    pub transactions: Vec<Transaction>,
}

/// Runs one document through every stage, stopping at the first failure.
pub struct Pipeline<'a> {
    client: &'a dyn CompletionClient,
}

impl<'a> Pipeline<'a> {
    pub fn new(client: &'a dyn CompletionClient) -> Self {
        Self { client }
    }

    /// Load, extract and normalize an invoice without storing it.
    pub async fn extract_invoice(&self, path: &Path) -> Result<Normalized<InvoiceRecord>> {
        let document = load_document(path)?;
        let raw = self.fetch(&document, DocumentKind::Invoice).await?;
        Ok(normalize_invoice(&raw)?)
    }

    /// Load, extract and normalize a statement without exporting it.
    pub async fn extract_statement(&self, path: &Path) -> Result<Vec<Normalized<Transaction>>> {
        let document = load_document(path)?;
        let raw = self.fetch(&document, DocumentKind::Statement).await?;
        Ok(normalize_transactions(&raw)?)
    }

    /// Extract an invoice and hand it to `sink`.
    pub async fn process_invoice<S>(&self, path: &Path, sink: &mut S) -> Result<InvoiceSummary>
    where
        S: RecordSink<InvoiceRecord> + ?Sized,
    {
        let document = load_document(path)?;
        self.process_invoice_document(&document, sink).await
    }

    /// Extract an already loaded invoice and hand it to `sink`.
    pub async fn process_invoice_document<S>(
        &self,
        document: &EncodedDocument,
        sink: &mut S,
    ) -> Result<InvoiceSummary>
    where
        S: RecordSink<InvoiceRecord> + ?Sized,
    {
        let start = Instant::now();
        let raw = self.fetch(document, DocumentKind::Invoice).await?;
        let normalized = normalize_invoice(&raw)?;
        let invoice = normalized.record;

        sink.write_records(std::slice::from_ref(&invoice))?;

        let details = &invoice.invoice_details;
        let summary = InvoiceSummary {
            issuer: details.invoice_issuer.clone(),
            number: details.invoice_number.clone(),
            date: details.invoice_date.clone(),
            total: details.total_cost,
            item_count: invoice.line_items.len(),
            defaulted_fields: normalized.defaulted,
            issues: invoice.validate(),
            destination: sink.destination(),
        };

        info!(
            "Invoice {} from {} stored in {:?}",
            summary.number,
            document.path.display(),
            start.elapsed()
        );
        Ok(summary)
    }

    /// Extract a statement and hand its transactions to `sink`.
    pub async fn process_statement<S>(&self, path: &Path, sink: &mut S) -> Result<StatementSummary>
    where
        S: RecordSink<Transaction> + ?Sized,
    {
        let document = load_document(path)?;
        self.process_statement_document(&document, sink).await
    }

    /// Extract an already loaded statement and hand its transactions to `sink`.
    pub async fn process_statement_document<S>(
        &self,
        document: &EncodedDocument,
        sink: &mut S,
    ) -> Result<StatementSummary>
    where
        S: RecordSink<Transaction> + ?Sized,
    {
        let start = Instant::now();
        let raw = self.fetch(document, DocumentKind::Statement).await?;
        let normalized = normalize_transactions(&raw)?;

        let defaulted_rows = normalized.iter().filter(|t| t.is_defaulted()).count();
        let transactions: Vec<Transaction> =
            normalized.into_iter().map(Normalized::into_record).collect();

        let rows = sink.write_records(&transactions)?;

        info!(
            "{} transactions from {} written in {:?}",
            rows,
            document.path.display(),
            start.elapsed()
        );
        Ok(StatementSummary {
            rows,
            defaulted_rows,
            destination: sink.destination(),
            transactions,
        })
    }

    async fn fetch(&self, document: &EncodedDocument, kind: DocumentKind) -> Result<String> {
        debug!("Extracting {} from {}", kind, document.path.display());
        Ok(self.client.complete(document, kind.instruction()).await?)
    }
}
