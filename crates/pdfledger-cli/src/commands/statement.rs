//! Statement command - export bank statement transactions to CSV.

use std::path::PathBuf;

use clap::Args;
use console::style;

use pdfledger_core::{CsvExport, Error, Pipeline, StatementSummary, Transaction, load_document};

use super::{build_client, load_config, money, spinner};

/// Arguments for the statement command.
#[derive(Args)]
pub struct StatementArgs {
    /// Bank statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output CSV (default: <input stem>_transactions.csv)
    output: Option<PathBuf>,
}

pub async fn run(args: StatementArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let document = load_document(&args.input).map_err(Error::from)?;
    let client = build_client(&config)?;

    let output = args
        .output
        .unwrap_or_else(|| config.default_statement_output(&args.input));
    let mut export = CsvExport::new(output);

    let pb = spinner(format!("Extracting transactions from {}...", args.input.display()));
    let result = Pipeline::new(&client)
        .process_statement_document(&document, &mut export)
        .await;
    pb.finish_and_clear();

    let summary = result?;
    print_summary(&summary, config.export.sample_rows);

    Ok(())
}

pub fn print_summary(summary: &StatementSummary, sample_rows: usize) {
    println!(
        "{} Saved {} transactions to {}",
        style("✓").green(),
        summary.rows,
        summary.destination
    );
    if summary.defaulted_rows > 0 {
        println!(
            "{} {} rows had missing fields filled with defaults",
            style("ℹ").blue(),
            summary.defaulted_rows
        );
    }

    if sample_rows == 0 {
        return;
    }
    println!();
    println!("{}", style("Sample:").bold());
    println!(
        "  {:<10} {:<20} {:<32} {:>12} {:>12}",
        "Date", "Type", "Description", "Amount", "Balance"
    );
    for transaction in summary.transactions.iter().take(sample_rows) {
        println!("  {}", format_row(transaction));
    }
}

fn format_row(t: &Transaction) -> String {
    format!(
        "{:<10} {:<20} {:<32} {:>12} {:>12}",
        t.date,
        truncate(&t.transaction_type, 20),
        truncate(&t.transaction, 32),
        money(t.amount),
        money(t.statement_balance)
    )
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}
