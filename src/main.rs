//! CLI entry point for the IAPS rating analysis tool.
//!
//! Joins participant trial logs against the IAPS reference ratings and
//! writes per-file summary and sorted trial tables.

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use iaps_rater::{
    batch,
    config::{AnalysisConfig, ColumnLayout, DEFAULT_OUTPUT_DIR, DEFAULT_REFERENCE},
    discover::collect_csv_files,
    output::print_json,
    reference::ReferenceTable,
    trials::RawTrials,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "iaps_rater")]
#[command(about = "Analyze IAPS image-rating task results", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Reference ratings CSV
    #[arg(long, env = "IAPS_REFERENCE", default_value = DEFAULT_REFERENCE, global = true)]
    reference: PathBuf,

    /// Optional JSON file overriding the trial column layout
    #[arg(long, global = true)]
    columns: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze trial CSV files (directories are searched recursively)
    Analyze {
        #[arg(value_name = "FILE_OR_DIR", required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the _ANALYSIS and _SORTED outputs
        #[arg(short, long, env = "IAPS_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Also log each summary table as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List stimuli in trial files that have no reference record
    CheckCoverage {
        #[arg(value_name = "FILE_OR_DIR", required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/iaps_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("iaps_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let columns = match &cli.common.columns {
        Some(path) => ColumnLayout::load(path)
            .with_context(|| format!("Failed to load column layout {}", path.display()))?,
        None => ColumnLayout::default(),
    };

    // Fatal before any file is touched
    let reference = ReferenceTable::load(&cli.common.reference).context("Exiting operation")?;

    match cli.command {
        Commands::Analyze {
            inputs,
            output_dir,
            json,
        } => {
            let files = collect_csv_files(&inputs, &output_dir)?;
            if files.is_empty() {
                bail!("No CSV files were found in the given inputs");
            }

            let config = AnalysisConfig {
                reference_path: cli.common.reference,
                output_dir,
                columns,
            };
            analyze(&files, &reference, &config, json)?;
        }
        Commands::CheckCoverage { inputs } => {
            let files = collect_csv_files(&inputs, Path::new(DEFAULT_OUTPUT_DIR))?;
            check_coverage(&files, &reference, &columns)?;
        }
    }

    Ok(())
}

/// Runs the batch and reports failed files and the completion time.
fn analyze(files: &[PathBuf], reference: &ReferenceTable, config: &AnalysisConfig, json: bool) -> Result<()> {
    info!(
        count = files.len(),
        reference = %config.reference_path.display(),
        output_dir = %config.output_dir.display(),
        "Starting analysis"
    );

    let run = batch::run(files, reference, config)?;

    if json {
        for report in &run.completed {
            info!(path = %report.input.display(), "Summary");
            print_json(&report.blocks)?;
        }
    }

    if run.has_failures() {
        error!(count = run.failed.len(), "Total of invalid files");
        for path in &run.failed {
            error!(path = %path.display(), "File threw an exception");
        }
    }

    info!(
        "Operation completed {}",
        Local::now().format("%d %b %Y %H:%M:%S")
    );
    Ok(())
}

/// Reports stimuli without a reference record, per file.
fn check_coverage(files: &[PathBuf], reference: &ReferenceTable, columns: &ColumnLayout) -> Result<()> {
    let mut uncovered_files = 0;
    for path in files {
        let raw = RawTrials::read(path)?;
        let missing = raw.uncovered_stimuli(reference, columns)?;
        if missing.is_empty() {
            info!(path = %path.display(), "All stimuli covered");
        } else {
            uncovered_files += 1;
            warn!(path = %path.display(), missing = ?missing, "Stimuli without reference record");
        }
    }

    info!(checked = files.len(), uncovered_files, "Coverage check complete");
    Ok(())
}
