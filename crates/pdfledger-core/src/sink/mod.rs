//! Destinations for normalized records.

mod export;
mod store;

pub use export::CsvExport;
pub use store::{InvoiceStore, StoredInvoice};

use crate::error::Result;

/// Trait for anything that durably stores or exports records.
pub trait RecordSink<R> {
    /// Persist a batch of records and return how many were written.
    fn write_records(&mut self, records: &[R]) -> Result<usize>;

    /// Where the records end up, for operator messages.
    fn destination(&self) -> String;
}
