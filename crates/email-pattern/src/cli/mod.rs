//! Command-line surface over the inference and synthesis engine.
//!
//! Each command reads its input tables, runs the batch on a background
//! worker while logging progress, and writes the export atomically. The
//! binary only parses arguments and renders the outcome, so every command
//! can be exercised in tests without spawning a process.

mod error;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

pub use self::error::CliError;
use crate::batch::{ChannelObserver, spawn_batch};
use crate::error::BatchError;
use crate::inference::infer_with;
use crate::records::{
    DirectExportRow, DirectRecord, InferenceExportRow, PredictionExportRow, ProspectRecord,
    SampleRecord,
};
use crate::settings::{DEFAULT_INFERENCE_OUTPUT, DEFAULT_PREDICTION_OUTPUT, EmailPatternSettings};
use crate::synthesis::{synthesize_direct_with, synthesize_with};
use crate::table_io::{read_records_from_path, write_table};

/// Infer email conventions from samples and predict addresses from them.
#[derive(Debug, Clone, Parser)]
#[command(name = "email-pattern", version)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Detect the username convention of each sample email.
    Infer(InferArgs),
    /// Predict emails for prospects using conventions inferred from samples.
    Predict(PredictArgs),
    /// Generate emails from an explicit format label on each row.
    Direct(DirectArgs),
}

/// Arguments for `infer`.
#[derive(Debug, Clone, Args)]
pub struct InferArgs {
    /// Table with `First Name`, `Last Name` and `Email` columns.
    #[arg(long)]
    pub input: Utf8PathBuf,
    /// Export path; defaults to `pattern_analysis_results.csv` in the
    /// configured output directory.
    #[arg(long)]
    pub output: Option<Utf8PathBuf>,
}

/// Arguments for `predict`.
#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    /// Sample table used to learn per-domain conventions.
    #[arg(long)]
    pub sample: Utf8PathBuf,
    /// Table with `First Name`, `Last Name` and `URL` columns.
    #[arg(long)]
    pub input: Utf8PathBuf,
    /// Export path; defaults to `email_predictions.csv` in the configured
    /// output directory.
    #[arg(long)]
    pub output: Option<Utf8PathBuf>,
}

/// Arguments for `direct`.
#[derive(Debug, Clone, Args)]
pub struct DirectArgs {
    /// Table with `First Name`, `Last Name`, `Email Format` and `Domain`
    /// columns.
    #[arg(long)]
    pub input: Utf8PathBuf,
    /// Export path; defaults to `email_predictions.csv` in the configured
    /// output directory.
    #[arg(long)]
    pub output: Option<Utf8PathBuf>,
}

/// What a completed command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Rows in the processed table.
    pub rows: usize,
    /// Rows annotated with an error.
    pub failed: usize,
    /// Where the export was written.
    pub output: Utf8PathBuf,
}

impl Summary {
    /// Formats the line printed after a successful command.
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use email_pattern::cli::Summary;
    ///
    /// let summary = Summary {
    ///     rows: 3,
    ///     failed: 1,
    ///     output: Utf8PathBuf::from("out.csv"),
    /// };
    /// assert_eq!(summary.message(), "processed 3 rows (1 failed), wrote out.csv");
    /// ```
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "processed {} rows ({} failed), wrote {}",
            self.rows, self.failed, self.output
        )
    }
}

/// Runs the parsed command.
///
/// # Errors
///
/// Returns [`CliError`] when an input table is unreadable or rejected, the
/// batch cannot run to completion, or the export cannot be written.
/// `predict` fails with [`BatchError::NoConventions`] before writing anything
/// when the sample table yields no conventions.
pub fn run(cli: &Cli, settings: &EmailPatternSettings) -> Result<Summary, CliError> {
    match &cli.command {
        Command::Infer(args) => run_infer(args, settings),
        Command::Predict(args) => run_predict(args, settings),
        Command::Direct(args) => run_direct(args, settings),
    }
}

fn output_path(
    explicit: Option<&Utf8PathBuf>,
    settings: &EmailPatternSettings,
    default_name: &str,
) -> Utf8PathBuf {
    explicit.map_or_else(|| settings.default_output(default_name), Clone::clone)
}

fn run_batch<T, F>(name: &str, settings: &EmailPatternSettings, job: F) -> Result<T, CliError>
where
    T: Send + 'static,
    F: FnOnce(&mut ChannelObserver) -> Result<T, BatchError> + Send + 'static,
{
    let handle = spawn_batch(name, settings.progress_every(), job).map_err(|err| {
        CliError::Spawn {
            message: err.to_string(),
        }
    })?;
    for progress in handle.progress() {
        info!(
            batch = name,
            processed = progress.processed,
            total = progress.total,
            fraction = progress.fraction(),
            "batch progress"
        );
    }
    Ok(handle.join()?)
}

fn finish<S: Serialize>(
    rows: &[S],
    failed: usize,
    output: &Utf8Path,
) -> Result<Summary, CliError> {
    write_table(output, rows)?;
    info!(path = %output, rows = rows.len(), failed, "export written");
    Ok(Summary {
        rows: rows.len(),
        failed,
        output: output.to_path_buf(),
    })
}

fn run_infer(args: &InferArgs, settings: &EmailPatternSettings) -> Result<Summary, CliError> {
    let samples: Vec<SampleRecord> = read_records_from_path(&args.input)?;
    let inference = run_batch("inference", settings, move |observer| {
        infer_with(&samples, observer)
    })?;
    let rows: Vec<InferenceExportRow> = inference.records.iter().map(Into::into).collect();
    let output = output_path(args.output.as_ref(), settings, DEFAULT_INFERENCE_OUTPUT);
    finish(&rows, inference.failure_count(), &output)
}

fn run_predict(args: &PredictArgs, settings: &EmailPatternSettings) -> Result<Summary, CliError> {
    let samples: Vec<SampleRecord> = read_records_from_path(&args.sample)?;
    let prospects: Vec<ProspectRecord> = read_records_from_path(&args.input)?;

    let inference = run_batch("inference", settings, move |observer| {
        infer_with(&samples, observer)
    })?;
    let table = inference.store;
    if table.is_empty() {
        return Err(BatchError::NoConventions.into());
    }
    let results = run_batch("synthesis", settings, move |observer| {
        synthesize_with(&prospects, &table, observer)
    })?;
    let failed = results.iter().filter(|r| r.is_failure()).count();
    let rows: Vec<PredictionExportRow> = results.iter().map(Into::into).collect();
    let output = output_path(args.output.as_ref(), settings, DEFAULT_PREDICTION_OUTPUT);
    finish(&rows, failed, &output)
}

fn run_direct(args: &DirectArgs, settings: &EmailPatternSettings) -> Result<Summary, CliError> {
    let records: Vec<DirectRecord> = read_records_from_path(&args.input)?;
    let results = run_batch("direct", settings, move |observer| {
        synthesize_direct_with(&records, observer)
    })?;
    let failed = results.iter().filter(|r| r.is_failure()).count();
    let rows: Vec<DirectExportRow> = results.iter().map(Into::into).collect();
    let output = output_path(args.output.as_ref(), settings, DEFAULT_PREDICTION_OUTPUT);
    finish(&rows, failed, &output)
}

#[cfg(test)]
mod tests;
