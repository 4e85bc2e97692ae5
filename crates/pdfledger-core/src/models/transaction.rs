//! Bank statement transaction records.

use serde::{Deserialize, Serialize};

/// Column names of a transaction row, in output order.
pub const TRANSACTION_FIELDS: [&str; 5] = [
    "date",
    "transaction_type",
    "transaction",
    "amount",
    "statement_balance",
];

/// One line of a bank statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Posting date, DD/MM/YY as printed.
    pub date: String,

    /// Bank's transaction type label (e.g. "SALE DEBIT").
    pub transaction_type: String,

    /// Merchant or description.
    pub transaction: String,

    /// Signed amount; debits are negative.
    pub amount: f64,

    /// Running balance after this transaction.
    pub statement_balance: f64,
}
