//! CSV export of statement transactions.

use std::path::{Path, PathBuf};

use tracing::info;

use super::RecordSink;
use crate::error::{ExportError, Result};
use crate::models::transaction::Transaction;

/// Writes transactions to a CSV file, replacing any existing file.
#[derive(Debug, Clone)]
pub struct CsvExport {
    path: PathBuf,
}

impl CsvExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a header row and one row per transaction.
    ///
    /// An empty slice is rejected before the file is touched.
    pub fn write(&self, transactions: &[Transaction]) -> std::result::Result<usize, ExportError> {
        if transactions.is_empty() {
            return Err(ExportError::Empty);
        }

        let mut wtr = csv::Writer::from_path(&self.path)?;
        for transaction in transactions {
            wtr.serialize(transaction)?;
        }
        wtr.flush()?;

        info!("Saved {} transactions to {}", transactions.len(), self.path.display());
        Ok(transactions.len())
    }
}

impl RecordSink<Transaction> for CsvExport {
    fn write_records(&mut self, records: &[Transaction]) -> Result<usize> {
        Ok(self.write(records)?)
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::TRANSACTION_FIELDS;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Transaction> {
        vec![
            Transaction {
                date: "01/02/25".to_string(),
                transaction_type: "SALE DEBIT".to_string(),
                transaction: "SPayLater Repayment".to_string(),
                amount: -147.99,
                statement_balance: 5166.68,
            },
            Transaction {
                date: "03/02/25".to_string(),
                transaction_type: "TRANSFER FROM A/C".to_string(),
                transaction: "Rent, February".to_string(),
                amount: -27.5,
                statement_balance: 5016.18,
            },
        ]
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feb_transactions.csv");

        let written = CsvExport::new(&path).write(&sample()).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], TRANSACTION_FIELDS.join(","));
        assert_eq!(lines[1], "01/02/25,SALE DEBIT,SPayLater Repayment,-147.99,5166.68");
        assert_eq!(lines[2], "03/02/25,TRANSFER FROM A/C,\"Rent, February\",-27.5,5016.18");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale\nstale\nstale\nstale\n").unwrap();

        CsvExport::new(&path).write(&sample()[..1]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_empty_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        assert!(matches!(CsvExport::new(&path).write(&[]), Err(ExportError::Empty)));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.csv");

        let mut sink = CsvExport::new(&path);
        let err = sink.write_records(&sample()).unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Sink);
    }
}
