//! Bank statement transaction normalization.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::coerce::FieldReader;
use super::{Normalized, Result, json_type, parse_payload};
use crate::error::ParseError;
use crate::models::transaction::Transaction;

/// Parse a model reply into transactions.
///
/// The reply must be a JSON array (optionally fenced). Every element yields
/// exactly one transaction, in order, whatever its quality.
pub fn normalize_transactions(raw: &str) -> Result<Vec<Normalized<Transaction>>> {
    let payload = parse_payload(raw)?;

    let items = match payload {
        Value::Array(items) => items,
        other => {
            return Err(ParseError::MalformedStructure {
                expected: "array",
                found: json_type(&other),
            });
        }
    };

    let transactions: Vec<_> = items
        .iter()
        .enumerate()
        .map(|(i, item)| normalize_transaction(i, item))
        .collect();

    let defaulted = transactions.iter().filter(|t| t.is_defaulted()).count();
    if defaulted > 0 {
        warn!(
            "{} of {} transactions needed default values",
            defaulted,
            transactions.len()
        );
    }
    info!("Successfully parsed {} transactions", transactions.len());

    Ok(transactions)
}

fn normalize_transaction(index: usize, item: &Value) -> Normalized<Transaction> {
    let mut fields = FieldReader::new(item, "");
    if !fields.is_object() {
        warn!("Transaction {} is a {}, using defaults", index, json_type(item));
    }

    let record = Transaction {
        date: fields.text("date"),
        transaction_type: fields.category("transaction_type"),
        transaction: fields.text("transaction"),
        amount: fields.money("amount"),
        statement_balance: fields.money("statement_balance"),
    };

    let defaulted = fields.into_defaulted();
    if !defaulted.is_empty() {
        debug!(
            "Transaction {} ({} - {}) defaulted: {}",
            index,
            record.date,
            record.transaction,
            defaulted.join(", ")
        );
    }

    Normalized::new(record, defaulted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_example_statement_row() {
        let raw = r#"[{"date":"01/02/25","transaction_type":"SALE DEBIT","transaction":"Shop","amount":"RM-147.99","statement_balance":"5,166.68"}]"#;

        let rows = normalize_transactions(raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].record,
            Transaction {
                date: "01/02/25".to_string(),
                transaction_type: "SALE DEBIT".to_string(),
                transaction: "Shop".to_string(),
                amount: -147.99,
                statement_balance: 5166.68,
            }
        );
        assert!(!rows[0].is_defaulted());
    }

    #[test]
    fn test_fenced_reply() {
        let raw = "```json\n[\n  {\"date\": \"03/02/25\", \"transaction_type\": \"TRANSFER FROM A/C\", \"transaction\": \"MBBQR1522764\", \"amount\": -27.50, \"statement_balance\": 5016.18}\n]\n```";

        let rows = normalize_transactions(raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.amount, -27.50);
        assert_eq!(rows[0].record.statement_balance, 5016.18);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let raw = r#"[
            {"date": "05/02/25", "amount": "(50.00)"},
            {},
            42
        ]"#;

        let rows = normalize_transactions(raw).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].record.amount, -50.0);
        assert_eq!(rows[0].record.transaction_type, "UNKNOWN");
        assert_eq!(rows[0].record.transaction, "");
        assert_eq!(rows[0].record.statement_balance, 0.0);
        assert_eq!(
            rows[0].defaulted,
            vec!["transaction_type", "transaction", "statement_balance"]
        );

        for row in &rows[1..] {
            assert_eq!(row.record, Transaction {
                transaction_type: "UNKNOWN".to_string(),
                ..Transaction::default()
            });
            assert_eq!(row.defaulted.len(), 5);
        }
    }

    #[test]
    fn test_unparseable_amount_keeps_record() {
        let raw = r#"[{"date": "07/02/25", "transaction_type": "DEBIT", "transaction": "Cafe", "amount": "see note", "statement_balance": null}]"#;

        let rows = normalize_transactions(raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.transaction, "Cafe");
        assert_eq!(rows[0].record.amount, 0.0);
        assert_eq!(rows[0].defaulted, vec!["amount", "statement_balance"]);
    }

    #[test]
    fn test_same_length_fully_populated() {
        let raw = serde_json::json!([
            {"date": "01/02/25", "transaction_type": "A", "transaction": "x", "amount": 1, "statement_balance": 2},
            {"date": "02/02/25", "transaction_type": "B", "transaction": "y", "amount": "3.5", "statement_balance": "4"},
            {"date": "03/02/25", "transaction_type": "C", "transaction": "z", "amount": -5, "statement_balance": 6.25},
        ])
        .to_string();

        let rows = normalize_transactions(&raw).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| !r.is_defaulted()));
        assert_eq!(rows[1].record.amount, 3.5);
    }

    #[test]
    fn test_renormalizing_is_idempotent() {
        let raw = r#"[
            {"date": "01/02/25", "transaction_type": "SALE DEBIT", "transaction": "Shop", "amount": "RM-147.99", "statement_balance": "5,166.68"},
            {"date": null, "amount": "(1,000.00)"}
        ]"#;

        let first: Vec<Transaction> = normalize_transactions(raw)
            .unwrap()
            .into_iter()
            .map(Normalized::into_record)
            .collect();

        let serialized = serde_json::to_string(&first).unwrap();
        let second: Vec<Transaction> = normalize_transactions(&serialized)
            .unwrap()
            .into_iter()
            .map(Normalized::into_record)
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_non_array_fails() {
        match normalize_transactions(r#"{"transactions": []}"#) {
            Err(ParseError::MalformedStructure { expected, found }) => {
                assert_eq!(expected, "array");
                assert_eq!(found, "object");
            }
            other => panic!("expected MalformedStructure, got {:?}", other),
        }

        assert!(matches!(
            normalize_transactions("I could not read this statement."),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(normalize_transactions(""), Err(ParseError::Empty)));
    }

    #[test]
    fn test_empty_array_is_ok() {
        assert_eq!(normalize_transactions("[]").unwrap().len(), 0);
    }
}
