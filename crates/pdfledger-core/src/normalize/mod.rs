//! Tolerant normalization of model replies into typed records.
//!
//! Only a reply that is not JSON, or has the wrong top-level shape, fails.
//! Inside a valid payload every record is kept: fields that are missing or
//! cannot be coerced take a fixed default and are listed on the
//! [`Normalized`] wrapper.

pub mod coerce;
mod invoice;
mod transactions;

pub use coerce::{DEFAULT_AMOUNT, DEFAULT_TEXT, UNKNOWN, coerce_money, coerce_text, parse_money};
pub use invoice::normalize_invoice;
pub use transactions::normalize_transactions;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::error::ParseError;

/// Result type for normalization.
pub type Result<T> = std::result::Result<T, ParseError>;

lazy_static! {
    static ref FENCE_OPEN: Regex = Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*").unwrap();
    static ref FENCE_CLOSE: Regex = Regex::new(r"```$").unwrap();
}

/// A record plus the names of the fields that were filled with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    /// The normalized record.
    pub record: T,
    /// Qualified names of defaulted fields, in reading order.
    pub defaulted: Vec<String>,
}

impl<T> Normalized<T> {
    pub fn new(record: T, defaulted: Vec<String>) -> Self {
        Self { record, defaulted }
    }

    /// Whether any field of this record is synthetic.
    pub fn is_defaulted(&self) -> bool {
        !self.defaulted.is_empty()
    }

    pub fn into_record(self) -> T {
        self.record
    }
}

/// Remove surrounding whitespace and Markdown code fences.
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = match FENCE_OPEN.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    let text = match FENCE_CLOSE.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    };
    text.trim()
}

/// Strip fences and parse the remaining text as JSON.
pub(crate) fn parse_payload(raw: &str) -> Result<Value> {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(serde_json::from_str(text)?)
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("  ```\n{}\n```  \n"), "{}");
        assert_eq!(strip_code_fences("[1]"), "[1]");
        assert_eq!(strip_code_fences("```json [1]```"), "[1]");
        assert_eq!(strip_code_fences("```"), "");
    }

    #[test]
    fn test_parse_payload_errors() {
        assert!(matches!(parse_payload("   "), Err(ParseError::Empty)));
        assert!(matches!(parse_payload("```json\n```"), Err(ParseError::Empty)));
        assert!(matches!(
            parse_payload("Here are your transactions:"),
            Err(ParseError::Json(_))
        ));
    }
}
