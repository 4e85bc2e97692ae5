//! CLI application for extracting invoices and bank statements from PDFs.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, invoice, invoices, statement};

/// pdfledger - Extract invoices and bank statements from PDFs with an LLM
#[derive(Parser)]
#[command(name = "pdfledger")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract an invoice and store it in the database
    Invoice(invoice::InvoiceArgs),

    /// Extract bank statement transactions to CSV
    Statement(statement::StatementArgs),

    /// Process multiple files matching a glob pattern
    Batch(batch::BatchArgs),

    /// Inspect and maintain stored invoices
    Invoices(invoices::InvoicesArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commands::report_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    commands::load_dotenv()?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Invoice(args) => invoice::run(args, config_path).await,
        Commands::Statement(args) => statement::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Invoices(args) => invoices::run(args, config_path),
        Commands::Config(args) => config::run(args, config_path),
    }
}
