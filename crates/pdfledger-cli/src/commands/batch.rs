//! Batch processing command for multiple PDF files.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use pdfledger_core::models::config::AppConfig;
use pdfledger_core::{CsvExport, Error, InvoiceStore, Pipeline};

use super::{build_client, load_config, open_store};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching the input PDFs
    #[arg(required = true)]
    input: String,

    /// Kind of documents matched by the pattern
    #[arg(short, long, value_enum)]
    kind: Kind,

    /// Output directory for statement CSVs
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Kind {
    /// Advertising invoices, stored in the database
    Invoice,
    /// Bank statements, exported to CSV
    Statement,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    outcome: Result<String, String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
        config.export.output_dir = Some(output_dir.clone());
    }

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("pdf")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching PDF files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let outputs = match args.kind {
        Kind::Statement => statement_outputs(&config, &files)?,
        Kind::Invoice => Vec::new(),
    };

    let client = build_client(&config)?;
    let pipeline = Pipeline::new(&client);
    let mut store: Option<InvoiceStore> = match args.kind {
        Kind::Invoice => Some(open_store(&config)?),
        Kind::Statement => None,
    };

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for (i, path) in files.into_iter().enumerate() {
        let outcome = match store.as_mut() {
            Some(store) => pipeline
                .process_invoice(&path, store)
                .await
                .map(|s| format!("invoice {}", s.number)),
            None => {
                let output = outputs
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| config.default_statement_output(&path));
                let mut export = CsvExport::new(output);
                pipeline
                    .process_statement(&path, &mut export)
                    .await
                    .map(|s| format!("{} transactions -> {}", s.rows, s.destination))
            }
        };

        match outcome {
            Ok(message) => {
                pb.println(format!(
                    "{} {}: {}",
                    style("✓").green(),
                    path.display(),
                    message
                ));
                results.push(FileResult {
                    path,
                    outcome: Ok(message),
                });
            }
            Err(e) if args.continue_on_error => {
                warn!("Failed to process {}: {}", path.display(), e);
                pb.println(format!(
                    "{} {}: {} error: {}",
                    style("✗").red(),
                    path.display(),
                    e.category().label(),
                    e
                ));
                results.push(FileResult {
                    path,
                    outcome: Err(e.to_string()),
                });
            }
            Err(e) => {
                pb.abandon();
                error!("Failed to process {}: {}", path.display(), e);
                return Err(e.into());
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if let Some(store) = store {
        store.close().map_err(Error::from)?;
    }

    let failed: Vec<_> = results.iter().filter(|r| r.outcome.is_err()).collect();
    let succeeded = results.len() - failed.len();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(succeeded).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(message) = &result.outcome {
                println!("  - {}: {}", result.path.display(), message);
            }
        }
        anyhow::bail!("{} of {} files failed", failed.len(), results.len());
    }

    Ok(())
}

/// One CSV per statement. Inputs sharing a file stem are prefixed with
/// their parent directory name; any remaining clash is an error.
fn statement_outputs(config: &AppConfig, files: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let plain: Vec<PathBuf> = files
        .iter()
        .map(|p| config.default_statement_output(p))
        .collect();

    let mut counts: HashMap<&PathBuf, usize> = HashMap::new();
    for output in &plain {
        *counts.entry(output).or_default() += 1;
    }

    let mut seen = HashSet::new();
    let mut outputs = Vec::with_capacity(files.len());
    for (input, output) in files.iter().zip(&plain) {
        let output = if counts[&output] > 1 {
            qualified_output(output, input)
        } else {
            output.clone()
        };
        if !seen.insert(output.clone()) {
            anyhow::bail!(
                "More than one input would be written to {}; narrow the pattern or use separate runs",
                output.display()
            );
        }
        debug!("{} -> {}", input.display(), output.display());
        outputs.push(output);
    }

    Ok(outputs)
}

fn qualified_output(output: &Path, input: &Path) -> PathBuf {
    let parent = input
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("root");
    let name = output
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("statement_transactions.csv");
    output.with_file_name(format!("{}_{}", parent, name))
}
