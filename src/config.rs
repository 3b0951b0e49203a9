//! Analysis configuration: input locations and the trial column layout.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coerce::Converter;

pub const DEFAULT_REFERENCE: &str = "IAPS_REFERENCE.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "IAPS_analysis_results";

/// Names of the trial columns the analysis reads, and how the two key-press
/// columns are encoded.
///
/// Stored as a JSON object on disk; omitted keys keep their defaults:
/// ```json
/// {
///   "valence_keys": "Valence_key.keys",
///   "valence_key_encoding": "rank_key"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub repetition: String,
    pub stimulus: String,
    pub valence_keys: String,
    pub valence_rt: String,
    pub arousal_keys: String,
    pub arousal_rt: String,
    pub valence_key_encoding: Converter,
    pub arousal_key_encoding: Converter,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            repetition: "trials.thisRepN".to_string(),
            stimulus: "stimFile".to_string(),
            valence_keys: "Valence_key.keys".to_string(),
            valence_rt: "Valence_key.rt".to_string(),
            arousal_keys: "Arousal_key.keys".to_string(),
            arousal_rt: "Arousal_key.rt".to_string(),
            valence_key_encoding: Converter::Integer,
            arousal_key_encoding: Converter::RankKey,
        }
    }
}

impl ColumnLayout {
    /// Loads a layout from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The four response columns with their converters, in summary order:
    /// valence rating, valence RT, arousal rating, arousal RT.
    pub fn response_columns(&self) -> [(&str, Converter); 4] {
        [
            (self.valence_keys.as_str(), self.valence_key_encoding),
            (self.valence_rt.as_str(), Converter::Float),
            (self.arousal_keys.as_str(), self.arousal_key_encoding),
            (self.arousal_rt.as_str(), Converter::Float),
        ]
    }
}

/// Everything a batch run needs besides the list of input files.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub reference_path: PathBuf,
    pub output_dir: PathBuf,
    pub columns: ColumnLayout,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_path: PathBuf::from(DEFAULT_REFERENCE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            columns: ColumnLayout::default(),
        }
    }
}
