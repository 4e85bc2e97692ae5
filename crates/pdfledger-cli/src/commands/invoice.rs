//! Invoice command - extract a single invoice into the store.

use std::path::PathBuf;

use clap::Args;
use console::style;

use pdfledger_core::{Error, InvoiceSummary, Pipeline, load_document};

use super::{build_client, load_config, money, open_store, spinner};

/// Arguments for the invoice command.
#[derive(Args)]
pub struct InvoiceArgs {
    /// Invoice PDF
    #[arg(required = true)]
    input: PathBuf,
}

pub async fn run(args: InvoiceArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let document = load_document(&args.input).map_err(Error::from)?;
    let client = build_client(&config)?;
    let mut store = open_store(&config)?;

    let pb = spinner(format!("Extracting invoice from {}...", args.input.display()));
    let result = Pipeline::new(&client)
        .process_invoice_document(&document, &mut store)
        .await;
    pb.finish_and_clear();

    let summary = result?;
    store.close().map_err(Error::from)?;

    println!(
        "{} Invoice {} stored in {}",
        style("✓").green(),
        style(&summary.number).bold(),
        summary.destination
    );
    print_summary(&summary);

    Ok(())
}

pub fn print_summary(summary: &InvoiceSummary) {
    println!("  Issuer:     {}", summary.issuer);
    println!("  Date:       {}", summary.date);
    println!("  Total:      {}", money(summary.total));
    println!("  Line items: {}", summary.item_count);

    if !summary.defaulted_fields.is_empty() {
        println!(
            "{} Filled with defaults: {}",
            style("ℹ").blue(),
            summary.defaulted_fields.join(", ")
        );
    }
    if !summary.issues.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for issue in &summary.issues {
            eprintln!("  - {}", issue);
        }
    }
}
