//! Field coercion rules for loosely-typed model output.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

/// Default for text fields that are absent or unusable.
pub const DEFAULT_TEXT: &str = "";
/// Default for numeric fields that are absent or unparseable.
pub const DEFAULT_AMOUNT: f64 = 0.0;
/// Placeholder for categorical fields.
pub const UNKNOWN: &str = "UNKNOWN";

lazy_static! {
    /// A printed amount: optional sign and currency marker, optional
    /// accounting parentheses, digits with optional `,` or space grouping,
    /// an optional trailing sign and currency marker.
    static ref AMOUNT: Regex = Regex::new(concat!(
        r"^(?P<lead>[+-])?\s*(?:[A-Za-z]{1,3}|[$€£¥₹])?\s*",
        r"(?P<open>\()?\s*(?P<sign>[+-])?\s*",
        r"(?P<num>(?:[0-9]{1,3}(?:[,\x20][0-9]{3})+|[0-9]+)(?:\.[0-9]+)?)",
        r"\s*(?P<close>\))?\s*(?P<trail>[+-])?\s*(?:[A-Za-z]{1,3}|[$€£¥₹])?$",
    ))
    .unwrap();
}

/// Coerce a JSON value to text.
///
/// Strings are trimmed, numbers and booleans stringified; null, arrays and
/// objects have no text form.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerce a JSON value to an amount.
pub fn coerce_money(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_money(s),
        _ => None,
    }
}

/// Parse a printed amount such as `RM1,234.50`, `(50.00)` or `147.99-`.
///
/// Parentheses, a leading minus and a trailing minus all mean negative; at
/// most one sign is accepted. Anything else around or inside the number
/// fails the parse.
pub fn parse_money(s: &str) -> Option<f64> {
    let caps = AMOUNT.captures(s.trim())?;

    if caps.name("open").is_some() != caps.name("close").is_some() {
        return None;
    }

    let signs: Vec<&str> = ["lead", "sign", "trail"]
        .iter()
        .filter_map(|name| caps.name(name).map(|m| m.as_str()))
        .collect();
    if signs.len() > 1 {
        return None;
    }
    let negate = caps.name("open").is_some() || signs.first() == Some(&"-");

    let digits: String = caps["num"].chars().filter(|c| *c != ',' && *c != ' ').collect();
    let value: f64 = digits.parse().ok()?;
    Some(if negate { -value } else { value })
}

/// Reads fields from one JSON object, recording each field that had to be
/// defaulted.
pub(crate) struct FieldReader<'a> {
    object: Option<&'a Map<String, Value>>,
    prefix: String,
    defaulted: Vec<String>,
}

impl<'a> FieldReader<'a> {
    /// Reader over `value`; a non-object reads as all-missing.
    pub fn new(value: &'a Value, prefix: impl Into<String>) -> Self {
        Self {
            object: value.as_object(),
            prefix: prefix.into(),
            defaulted: Vec::new(),
        }
    }

    pub fn is_object(&self) -> bool {
        self.object.is_some()
    }

    /// Raw access to a field, for nested structures.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.object.and_then(|o| o.get(key))
    }

    /// Qualified name of a field, e.g. `line_items[2].cost`.
    pub fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    /// Note a field as synthesized.
    pub fn mark(&mut self, key: &str) {
        let path = self.path(key);
        self.defaulted.push(path);
    }

    /// Merge defaulted fields recorded by a nested reader.
    pub fn absorb(&mut self, fields: Vec<String>) {
        self.defaulted.extend(fields);
    }

    pub fn text(&mut self, key: &str) -> String {
        match self.get(key).and_then(coerce_text) {
            Some(text) => text,
            None => {
                self.mark(key);
                DEFAULT_TEXT.to_string()
            }
        }
    }

    pub fn money(&mut self, key: &str) -> f64 {
        match self.get(key).and_then(coerce_money) {
            Some(amount) => amount,
            None => {
                self.mark(key);
                DEFAULT_AMOUNT
            }
        }
    }

    /// Categorical text: empty counts as missing.
    pub fn category(&mut self, key: &str) -> String {
        match self.get(key).and_then(coerce_text).filter(|s| !s.is_empty()) {
            Some(text) => text,
            None => {
                self.mark(key);
                UNKNOWN.to_string()
            }
        }
    }

    pub fn into_defaulted(self) -> Vec<String> {
        self.defaulted
    }
}
