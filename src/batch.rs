//! Runs the analysis over a list of trial files.
//!
//! Files are independent of one another: a file whose strata cannot all be
//! averaged is recorded as failed and the batch moves on. Every other error
//! stops the batch.

use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::analyzers::aggregate::{sort_trials, summarize};
use crate::analyzers::types::AnalysisBlock;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::output::{OutputPaths, print_summary, write_outputs};
use crate::reference::ReferenceTable;
use crate::trials::{RawTrials, join};

/// Result of one successfully analyzed file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub outputs: OutputPaths,
    pub blocks: Vec<AnalysisBlock>,
}

/// Inputs of a batch invocation and what became of them.
#[derive(Debug, Default)]
pub struct BatchRun {
    pub inputs: Vec<PathBuf>,
    pub completed: Vec<FileReport>,
    pub failed: Vec<PathBuf>,
}

impl BatchRun {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Join, coerce, sort, aggregate and write a single trial file.
#[tracing::instrument(skip(path, reference, config), fields(path = %path.display()))]
pub fn analyze_file(path: &Path, reference: &ReferenceTable, config: &AnalysisConfig) -> Result<FileReport> {
    let raw = RawTrials::read(path)?;
    let mut table = join(raw, reference, &config.columns)?;
    table.coerce_responses(&config.columns)?;
    sort_trials(&mut table)?;

    let blocks = summarize(&table, &config.columns)?;
    print_summary(&blocks);

    let outputs = write_outputs(&config.output_dir, &table, &blocks)?;
    info!(
        trials = table.len(),
        summary = %outputs.summary.display(),
        sorted = %outputs.sorted.display(),
        "File analyzed"
    );

    Ok(FileReport {
        input: path.to_path_buf(),
        outputs,
        blocks,
    })
}

/// Analyzes each file in order.
///
/// # Errors
///
/// Returns the first error that is not [recoverable](crate::error::AnalysisError::is_recoverable);
/// recoverable failures are collected in [`BatchRun::failed`].
pub fn run(paths: &[PathBuf], reference: &ReferenceTable, config: &AnalysisConfig) -> Result<BatchRun> {
    let mut batch = BatchRun {
        inputs: paths.to_vec(),
        ..Default::default()
    };

    for path in paths {
        info!(path = %path.display(), "Analyzing");
        match analyze_file(path, reference, config) {
            Ok(report) => batch.completed.push(report),
            Err(e) if e.is_recoverable() => {
                error!(path = %path.display(), error = %e, "Error reading file, check file construction");
                batch.failed.push(path.clone());
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        total = batch.inputs.len(),
        completed = batch.completed.len(),
        failed = batch.failed.len(),
        "Batch finished"
    );
    Ok(batch)
}
