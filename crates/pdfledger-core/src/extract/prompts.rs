//! Instruction templates sent with each document.

/// Asks for a single JSON object describing an advertising invoice.
pub const INVOICE_INSTRUCTION: &str = r#"Extract the invoice details, campaign and every line item from this advertising invoice, and return only a JSON object in this format:

{
    "invoice_details": {
        "invoice_issuer": "company that issued the invoice",
        "invoice_number": "invoice number exactly as printed",
        "invoice_date": "DD/MM/YYYY",
        "total_cost": total amount as a number
    },
    "campaign": {
        "name": "campaign name",
        "start_date": "DD/MM/YYYY",
        "end_date": "DD/MM/YYYY"
    },
    "line_items": [
        {
            "description": "placement description",
            "platform": "advertising platform",
            "funnel_stage": "awareness | consideration | conversion | combination",
            "language": "language of the creative",
            "ad_format": "ad format",
            "cost": amount as a number
        }
    ]
}

Important:
1. Return ONLY the JSON object with no additional text or explanation
2. Make amounts numbers without currency symbols or thousands separators
3. Use "" for any field that does not appear on the invoice"#;

/// Asks for a JSON array of bank statement transactions.
pub const STATEMENT_INSTRUCTION: &str = r#"Extract all transactions from this bank statement, and return only a JSON array. Format each transaction as:

{
    "date": "DD/MM/YY",
    "transaction_type": "type of transaction",
    "transaction": "merchant or description",
    "amount": signed amount as a number,
    "statement_balance": statement balance as a number
}

Remove all symbols from the amounts, like RM or commas, but keep the sign of each transaction: negative for debits, positive for credits.

Example of expected format:
[
    {
        "date": "01/02/25",
        "transaction_type": "SALE DEBIT",
        "transaction": "SPayLater Repayment",
        "amount": -147.99,
        "statement_balance": 5166.68
    }
]

Important:
1. Return ONLY the JSON array with no additional text or explanation
2. Make amount a number, not a string
3. Make sure the JSON is properly formatted with no trailing commas"#;
