//! Expands CLI inputs into the list of trial files to analyze.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

fn is_csv(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("csv")
}

/// Files are taken as given; directories are walked recursively for
/// `*.csv` files in name order. Directories named like `skip_dir` (the
/// results directory) are not entered.
pub fn collect_csv_files(inputs: &[PathBuf], skip_dir: &Path) -> Result<Vec<PathBuf>> {
    let skip_name = skip_dir.file_name();
    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let walker = WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !(e.file_type().is_dir() && Some(e.file_name()) == skip_name));

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {}", input.display()))?;
            if entry.file_type().is_file() && is_csv(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    debug!(count = files.len(), "Input files collected");
    Ok(files)
}
