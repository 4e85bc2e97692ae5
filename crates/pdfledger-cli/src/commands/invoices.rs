//! Invoices command - inspect and maintain the invoice store.

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;

use pdfledger_core::Error;

use super::{load_config, money, open_store};

/// Arguments for the invoices command.
#[derive(Args)]
pub struct InvoicesArgs {
    #[command(subcommand)]
    command: InvoicesCommand,
}

#[derive(Subcommand)]
enum InvoicesCommand {
    /// List stored invoices
    List,

    /// Print a stored invoice as JSON
    Show {
        /// Invoice number
        number: String,
    },

    /// Merge a JSON patch into a stored invoice
    Update {
        /// Invoice number
        number: String,
        /// JSON object; keys may be dotted paths (e.g. "campaign.name")
        patch: String,
    },

    /// Delete a stored invoice
    Delete {
        /// Invoice number
        number: String,
    },
}

pub fn run(args: InvoicesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    match args.command {
        InvoicesCommand::List => {
            let invoices = store.list().map_err(Error::from)?;
            if invoices.is_empty() {
                println!("{} No invoices stored in {}", style("ℹ").blue(), store.location());
            } else {
                println!(
                    "{:<20} {:<28} {:<12} {:>12}  {}",
                    "Number", "Issuer", "Date", "Total", "Ingested"
                );
                for stored in &invoices {
                    let details = &stored.invoice.invoice_details;
                    println!(
                        "{:<20} {:<28} {:<12} {:>12}  {}",
                        details.invoice_number,
                        details.invoice_issuer,
                        details.invoice_date,
                        money(details.total_cost),
                        stored.ingested_at
                    );
                }
                println!();
                println!("{} invoices", invoices.len());
            }
        }
        InvoicesCommand::Show { number } => {
            let document = store
                .get_document(&number)
                .map_err(Error::from)?
                .with_context(|| format!("invoice {} not found", number))?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        InvoicesCommand::Update { number, patch } => {
            let patch: serde_json::Value =
                serde_json::from_str(&patch).context("patch is not valid JSON")?;
            if !store.update(&number, &patch).map_err(Error::from)? {
                anyhow::bail!("invoice {} not found", number);
            }
            println!("{} Updated invoice {}", style("✓").green(), number);
        }
        InvoicesCommand::Delete { number } => {
            if !store.delete(&number).map_err(Error::from)? {
                anyhow::bail!("invoice {} not found", number);
            }
            println!("{} Deleted invoice {}", style("✓").green(), number);
        }
    }

    store.close().map_err(Error::from)?;
    Ok(())
}
