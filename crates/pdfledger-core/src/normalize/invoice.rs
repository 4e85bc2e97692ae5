//! Advertising invoice normalization.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::coerce::FieldReader;
use super::{Normalized, Result, json_type, parse_payload};
use crate::error::ParseError;
use crate::models::invoice::{Campaign, FunnelStage, InvoiceDetails, InvoiceRecord, LineItem};

/// Parse a model reply into an invoice.
///
/// The reply must be a JSON object; a one-element array wrapping an object
/// is unwrapped. Header fields are read from `invoice_details` when present,
/// otherwise from the top level.
pub fn normalize_invoice(raw: &str) -> Result<Normalized<InvoiceRecord>> {
    let payload = parse_payload(raw)?;

    let payload = match payload {
        Value::Object(_) => payload,
        Value::Array(mut items) if items.len() == 1 && items[0].is_object() => items.remove(0),
        other => {
            return Err(ParseError::MalformedStructure {
                expected: "object",
                found: json_type(&other),
            });
        }
    };

    let mut root = FieldReader::new(&payload, "");

    let details_value = root.get("invoice_details").filter(|v| v.is_object()).unwrap_or(&payload);
    let mut details = FieldReader::new(details_value, "invoice_details");
    let invoice_details = InvoiceDetails {
        invoice_issuer: details.text("invoice_issuer"),
        invoice_number: details.text("invoice_number"),
        invoice_date: details.text("invoice_date"),
        total_cost: details.money("total_cost"),
    };
    root.absorb(details.into_defaulted());

    let campaign = match root.get("campaign") {
        Some(value) if value.is_object() => {
            let mut fields = FieldReader::new(value, "campaign");
            let campaign = Campaign {
                name: fields.text("name"),
                start_date: fields.text("start_date"),
                end_date: fields.text("end_date"),
            };
            root.absorb(fields.into_defaulted());
            campaign
        }
        _ => {
            root.mark("campaign");
            Campaign::default()
        }
    };

    let line_items = match root.get("line_items") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let (line, defaulted) = normalize_line_item(i, item);
                root.absorb(defaulted);
                line
            })
            .collect(),
        _ => {
            root.mark("line_items");
            Vec::new()
        }
    };

    let record = InvoiceRecord {
        invoice_details,
        campaign,
        line_items,
    };
    let defaulted = root.into_defaulted();

    if record.invoice_details.invoice_number.is_empty() {
        warn!("Invoice reply has no invoice number");
    }
    if !defaulted.is_empty() {
        debug!("Invoice defaulted: {}", defaulted.join(", "));
    }
    info!(
        "Parsed invoice {:?} with {} line items",
        record.invoice_details.invoice_number,
        record.line_items.len()
    );

    Ok(Normalized::new(record, defaulted))
}

fn normalize_line_item(index: usize, item: &Value) -> (LineItem, Vec<String>) {
    let mut fields = FieldReader::new(item, format!("line_items[{}]", index));

    let stage = fields.category("funnel_stage");
    let funnel_stage = match FunnelStage::parse(&stage) {
        Some(stage) => stage,
        None => {
            if stage != super::UNKNOWN {
                debug!("Unrecognized funnel stage {:?} on line item {}", stage, index);
                fields.mark("funnel_stage");
            }
            FunnelStage::Unknown
        }
    };

    let line = LineItem {
        description: fields.text("description"),
        platform: fields.text("platform"),
        funnel_stage,
        language: fields.text("language"),
        ad_format: fields.text("ad_format"),
        cost: fields.money("cost"),
    };

    (line, fields.into_defaulted())
}
