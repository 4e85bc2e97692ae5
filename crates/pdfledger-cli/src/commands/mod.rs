//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod invoice;
pub mod invoices;
pub mod statement;

use std::path::{Path, PathBuf};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use pdfledger_core::models::config::AppConfig;
use pdfledger_core::{AnthropicClient, Error, InvoiceStore};

/// `<config dir>/pdfledger/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pdfledger")
        .join("config.json")
}

/// The config file in effect: `-c` when given, the default path otherwise.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Read the config file (defaults when absent) without the env overlay.
pub fn read_config(path: &Path) -> Result<AppConfig, Error> {
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }
    AppConfig::from_file(path)
        .map_err(|e| Error::Config(format!("failed to load {}: {}", path.display(), e)))
}

/// Effective configuration: file or defaults, then the process environment.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, Error> {
    let path = config_file(config_path);
    if config_path.is_some() && !path.exists() {
        return Err(Error::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    Ok(read_config(&path)?.with_env_lookup(|key| std::env::var(key).ok()))
}

/// Load `.env` from the working directory or its ancestors, if there is one.
pub fn load_dotenv() -> Result<(), Error> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Config(format!("failed to read .env: {}", e))),
    }
}

pub fn build_client(config: &AppConfig) -> Result<AnthropicClient, Error> {
    let client = AnthropicClient::new(&config.api)?;
    debug!("Using model {}", client.model());
    Ok(client)
}

pub fn open_store(config: &AppConfig) -> Result<InvoiceStore, Error> {
    Ok(InvoiceStore::open(&config.store)?)
}

/// Spinner shown while the extraction service is working.
pub fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print the failure banner for `err`.
pub fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<Error>() {
        Some(e) => {
            eprintln!(
                "{} {} error: {}",
                style("✗").red(),
                e.category().label(),
                e
            );
            if e.is_duplicate() {
                eprintln!(
                    "  {} This invoice has already been processed.",
                    style("ℹ").blue()
                );
            }
        }
        None => eprintln!("{} Error: {:#}", style("✗").red(), err),
    }
}

/// Amounts are printed with two decimals.
pub fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}
