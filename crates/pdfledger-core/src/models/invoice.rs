//! Advertising invoice records as stored in the document store.

use serde::{Deserialize, Serialize};

/// A complete invoice extracted from a PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceRecord {
    /// Header fields, including the natural key.
    pub invoice_details: InvoiceDetails,

    /// Campaign the invoice bills for.
    pub campaign: Campaign,

    /// Line items in document order.
    pub line_items: Vec<LineItem>,
}

/// Invoice header information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceDetails {
    /// Company that issued the invoice.
    pub invoice_issuer: String,

    /// Invoice number; unique across the store.
    pub invoice_number: String,

    /// Issue date as printed on the invoice.
    pub invoice_date: String,

    /// Invoice total.
    pub total_cost: f64,
}

/// Campaign metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Campaign {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

/// A single billed placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    /// Placement description.
    pub description: String,

    /// Ad platform (e.g. Meta, Google).
    pub platform: String,

    /// Marketing funnel stage.
    pub funnel_stage: FunnelStage,

    /// Creative language.
    pub language: String,

    /// Ad format (e.g. video, carousel).
    pub ad_format: String,

    /// Cost of this line.
    pub cost: f64,
}

/// Marketing funnel stage of a line item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunnelStage {
    Awareness,
    Consideration,
    Conversion,
    /// Spans several stages.
    Combination,
    /// Absent or unrecognized.
    #[default]
    #[serde(rename = "UNKNOWN", other)]
    Unknown,
}

impl FunnelStage {
    /// Parse a funnel stage, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "awareness" => Some(FunnelStage::Awareness),
            "consideration" => Some(FunnelStage::Consideration),
            "conversion" => Some(FunnelStage::Conversion),
            "combination" => Some(FunnelStage::Combination),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FunnelStage::Awareness => "awareness",
            FunnelStage::Consideration => "consideration",
            FunnelStage::Conversion => "conversion",
            FunnelStage::Combination => "combination",
            FunnelStage::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InvoiceRecord {
    /// The natural key of this invoice.
    pub fn invoice_number(&self) -> &str {
        &self.invoice_details.invoice_number
    }

    /// Sum of line item costs.
    pub fn line_items_total(&self) -> f64 {
        self.line_items.iter().map(|item| item.cost).sum()
    }

    /// Check the invoice for obvious gaps and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.invoice_details.invoice_number.is_empty() {
            issues.push("Missing invoice number".to_string());
        }

        if self.invoice_details.invoice_issuer.is_empty() {
            issues.push("Missing invoice issuer".to_string());
        }

        if self.line_items.is_empty() {
            issues.push("No line items".to_string());
        }

        let calculated = self.line_items_total();
        if !self.line_items.is_empty()
            && (calculated - self.invoice_details.total_cost).abs() > 0.01
        {
            issues.push(format!(
                "Line item total ({:.2}) differs from invoice total ({:.2})",
                calculated, self.invoice_details.total_cost
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funnel_stage_parsing() {
        assert_eq!(FunnelStage::parse("Awareness"), Some(FunnelStage::Awareness));
        assert_eq!(FunnelStage::parse(" CONVERSION "), Some(FunnelStage::Conversion));
        assert_eq!(FunnelStage::parse("retargeting"), None);
    }

    #[test]
    fn test_funnel_stage_serde() {
        assert_eq!(
            serde_json::to_string(&FunnelStage::Combination).unwrap(),
            "\"combination\""
        );
        assert_eq!(serde_json::to_string(&FunnelStage::Unknown).unwrap(), "\"UNKNOWN\"");

        let stage: FunnelStage = serde_json::from_str("\"something else\"").unwrap();
        assert_eq!(stage, FunnelStage::Unknown);
    }

    #[test]
    fn test_validate_totals() {
        let mut invoice = InvoiceRecord::default();
        invoice.invoice_details.invoice_number = "INV-7".to_string();
        invoice.invoice_details.invoice_issuer = "Agency".to_string();
        invoice.invoice_details.total_cost = 300.0;
        invoice.line_items = vec![
            LineItem { cost: 100.0, ..LineItem::default() },
            LineItem { cost: 150.0, ..LineItem::default() },
        ];

        let issues = invoice.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("250.00"));
    }
}
