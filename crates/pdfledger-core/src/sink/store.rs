//! Invoice document store backed by SQLite.
//!
//! Each invoice is kept as a JSON document. The unique index on
//! `invoice_details.invoice_number` lives in the database, so duplicate
//! ingestion is refused by SQLite itself rather than by a pre-check.

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::RecordSink;
use crate::error::{Result, StoreError};
use crate::models::config::StoreConfig;
use crate::models::invoice::InvoiceRecord;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS invoices (
    id INTEGER PRIMARY KEY,
    document TEXT NOT NULL,
    ingested_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_invoices_invoice_number
    ON invoices (json_extract(document, '$.invoice_details.invoice_number'));
";

const KEY_EXPR: &str = "json_extract(document, '$.invoice_details.invoice_number')";

type StoreResult<T> = std::result::Result<T, StoreError>;

/// An invoice as read back from the store.
#[derive(Debug, Clone)]
pub struct StoredInvoice {
    pub id: i64,
    /// RFC 3339 time of insertion.
    pub ingested_at: String,
    pub invoice: InvoiceRecord,
}

/// Thin document-store adapter keyed by invoice number.
pub struct InvoiceStore {
    conn: Connection,
    location: String,
}

impl InvoiceStore {
    /// Open (creating if needed) the database described by `config`.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let path = config.db_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::open_path(&path)
    }

    /// Open a database file directly.
    pub fn open_path(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn, path.display().to_string())
    }

    /// Private in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?, ":memory:".to_string())
    }

    fn init(conn: Connection, location: String) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        debug!("Opened invoice store at {}", location);
        Ok(Self { conn, location })
    }

    /// Database location, for messages.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Insert an invoice; fails with [`StoreError::Duplicate`] if its number
    /// is already stored.
    pub fn insert(&self, invoice: &InvoiceRecord) -> StoreResult<i64> {
        insert_with(&self.conn, invoice)
    }

    /// Look up an invoice by number.
    pub fn get(&self, invoice_number: &str) -> StoreResult<Option<InvoiceRecord>> {
        self.get_document(invoice_number)?
            .map(|doc| serde_json::from_value::<InvoiceRecord>(doc).map_err(StoreError::from))
            .transpose()
    }

    /// Look up the raw stored document by number.
    pub fn get_document(&self, invoice_number: &str) -> StoreResult<Option<Value>> {
        Ok(self.find(invoice_number)?.map(|(_, doc)| doc))
    }

    /// Every stored invoice, in insertion order.
    pub fn list(&self) -> StoreResult<Vec<StoredInvoice>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, document, ingested_at FROM invoices ORDER BY id")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, document, ingested_at)| -> StoreResult<StoredInvoice> {
                Ok(StoredInvoice {
                    id,
                    ingested_at,
                    invoice: serde_json::from_str(&document)?,
                })
            })
            .collect()
    }

    /// Number of stored invoices.
    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT count(*) FROM invoices", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Merge `patch` into the stored document.
    ///
    /// Each key of the patch object replaces the value at that path; dotted
    /// keys such as `invoice_details.total_cost` address nested fields.
    /// Returns `false` when no invoice has this number.
    pub fn update(&self, invoice_number: &str, patch: &Value) -> StoreResult<bool> {
        let patch = patch
            .as_object()
            .ok_or_else(|| StoreError::InvalidUpdate("patch must be a JSON object".to_string()))?;

        let Some((id, mut document)) = self.find(invoice_number)? else {
            return Ok(false);
        };

        for (key, value) in patch {
            set_path(&mut document, key, value.clone())?;
        }

        // The merged document must still read back as an invoice.
        let patched = serde_json::from_value::<InvoiceRecord>(document.clone())
            .map_err(|e| StoreError::InvalidUpdate(format!("patched invoice is invalid: {}", e)))?;
        let new_number = patched.invoice_number();
        if new_number.is_empty() {
            return Err(StoreError::MissingKey);
        }

        self.conn
            .execute(
                "UPDATE invoices SET document = ?1 WHERE id = ?2",
                params![serde_json::to_string(&document)?, id],
            )
            .map_err(|e| unique_violation(e, new_number))?;

        debug!("Updated invoice {} ({} fields)", invoice_number, patch.len());
        Ok(true)
    }

    /// Delete an invoice by number; returns whether one was removed.
    pub fn delete(&self, invoice_number: &str) -> StoreResult<bool> {
        let removed = self.conn.execute(
            &format!("DELETE FROM invoices WHERE {} = ?1", KEY_EXPR),
            params![invoice_number],
        )?;
        Ok(removed > 0)
    }

    /// Close the connection, reporting any error from SQLite.
    ///
    /// Dropping the store also closes it.
    pub fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, e)| StoreError::from(e))
    }

    fn find(&self, invoice_number: &str) -> StoreResult<Option<(i64, Value)>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT id, document FROM invoices WHERE {} = ?1", KEY_EXPR),
                params![invoice_number],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        row.map(|(id, doc)| -> StoreResult<(i64, Value)> { Ok((id, serde_json::from_str(&doc)?)) })
            .transpose()
    }
}

impl RecordSink<InvoiceRecord> for InvoiceStore {
    /// Insert all invoices or none.
    fn write_records(&mut self, records: &[InvoiceRecord]) -> Result<usize> {
        let tx = self.conn.transaction().map_err(StoreError::from)?;
        for invoice in records {
            insert_with(&tx, invoice)?;
        }
        tx.commit().map_err(StoreError::from)?;
        Ok(records.len())
    }

    fn destination(&self) -> String {
        self.location.clone()
    }
}

fn insert_with(conn: &Connection, invoice: &InvoiceRecord) -> StoreResult<i64> {
    let number = invoice.invoice_number();
    if number.is_empty() {
        return Err(StoreError::MissingKey);
    }

    conn.execute(
        "INSERT INTO invoices (document, ingested_at) VALUES (?1, ?2)",
        params![serde_json::to_string(invoice)?, Utc::now().to_rfc3339()],
    )
    .map_err(|e| unique_violation(e, number))?;

    let id = conn.last_insert_rowid();
    info!("Stored invoice {} as document {}", number, id);
    Ok(id)
}

/// Map SQLite's unique-constraint failure onto [`StoreError::Duplicate`].
fn unique_violation(err: rusqlite::Error, invoice_number: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::Duplicate(invoice_number.to_string())
        }
        _ => StoreError::Database(err),
    }
}

/// Set `value` at a dotted path, creating intermediate objects.
fn set_path(document: &mut Value, path: &str, value: Value) -> StoreResult<()> {
    let mut parts = path.split('.').peekable();
    let mut current = document;

    while let Some(part) = parts.next() {
        if part.is_empty() {
            return Err(StoreError::InvalidUpdate(format!("invalid field path {:?}", path)));
        }

        let object = current.as_object_mut().ok_or_else(|| {
            StoreError::InvalidUpdate(format!("cannot set {:?} inside a non-object", path))
        })?;

        if parts.peek().is_none() {
            object.insert(part.to_string(), value);
            return Ok(());
        }

        current = object
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    Ok(())
}
