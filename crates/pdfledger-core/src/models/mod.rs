//! Record shapes and configuration.

pub mod config;
pub mod invoice;
pub mod transaction;

pub use config::AppConfig;
pub use invoice::{Campaign, FunnelStage, InvoiceDetails, InvoiceRecord, LineItem};
pub use transaction::{Transaction, TRANSACTION_FIELDS};
