//! Output formatting and persistence for per-file analysis results.
//!
//! Each input file yields a summary CSV (`<stem>_ANALYSIS.csv`) and the
//! sorted, joined trials (`<stem>_SORTED.csv`) in the results directory.

use anyhow::Result as AnyResult;
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::AnalysisBlock;
use crate::error::Result;
use crate::trials::TrialTable;

/// Where the two artifacts of one input file are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub summary: PathBuf,
    pub sorted: PathBuf,
}

impl OutputPaths {
    pub fn for_input(input: &Path, out_dir: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            summary: out_dir.join(format!("{stem}_ANALYSIS.csv")),
            sorted: out_dir.join(format!("{stem}_SORTED.csv")),
        }
    }
}

/// Writes the summary table: a header row then one row per block.
pub fn write_summary(path: &Path, blocks: &[AnalysisBlock]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    for block in blocks {
        writer.serialize(block)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = blocks.len(), "Summary written");
    Ok(())
}

/// Writes every trial with the table's header order.
pub fn write_sorted(path: &Path, table: &TrialTable) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(table.header())?;
    for record in table.records() {
        writer.write_record(record.cells().iter().map(|c| c.to_string()))?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = table.len(), "Sorted trials written");
    Ok(())
}

/// Writes both artifacts for `table`, creating `out_dir` if needed.
pub fn write_outputs(out_dir: &Path, table: &TrialTable, blocks: &[AnalysisBlock]) -> Result<OutputPaths> {
    fs::create_dir_all(out_dir)?;
    let paths = OutputPaths::for_input(table.source(), out_dir);
    write_summary(&paths.summary, blocks)?;
    write_sorted(&paths.sorted, table)?;
    Ok(paths)
}

/// Logs the per-block averages for the operator.
pub fn print_summary(blocks: &[AnalysisBlock]) {
    for block in blocks {
        info!(
            "{} Valence Block Statistics: Average Valence Rating = {:.3}, \
             Average Valence Response Time = {:.3}s, Average Arousal Rating = {:.3}, \
             Average Arousal Response Time = {:.3}s",
            block.name.to_uppercase(),
            block.avg_valence_rating,
            block.avg_valence_rt,
            block.avg_arousal_rating,
            block.avg_arousal_rt
        );
    }
}

/// Logs the summary table as pretty-printed JSON.
pub fn print_json(blocks: &[AnalysisBlock]) -> AnyResult<()> {
    info!("{}", serde_json::to_string_pretty(blocks)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks() -> Vec<AnalysisBlock> {
        ["all", "high", "medium", "low", "7to9", "4to6", "1to3"]
            .iter()
            .map(|n| AnalysisBlock::from_averages(n, [5.0, 1.25, 4.5, 0.75]))
            .collect()
    }

    #[test]
    fn test_output_paths_use_input_stem() {
        let paths = OutputPaths::for_input(Path::new("data/sub/p01.csv"), Path::new("results"));
        assert_eq!(paths.summary, Path::new("results/p01_ANALYSIS.csv"));
        assert_eq!(paths.sorted, Path::new("results/p01_SORTED.csv"));
    }

    #[test]
    fn test_write_summary_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p01_ANALYSIS.csv");
        write_summary(&path, &blocks()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "valence_block,avg_valence_rating,avg_valence_rt,avg_arousal_rating,avg_arousal_rt"
        );
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[1], "all,5.0,1.25,4.5,0.75");
        assert!(lines[7].starts_with("1to3,"));
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&blocks()).unwrap();
    }

    #[test]
    fn test_print_summary_does_not_panic() {
        print_summary(&blocks());
    }
}
