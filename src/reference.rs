//! The stimulus reference table: normative ratings for every image.
//!
//! Loaded once per process and shared read-only by every file analysis.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValenceRank {
    High,
    Medium,
    Low,
}

impl ValenceRank {
    pub const ALL: [ValenceRank; 3] = [ValenceRank::High, ValenceRank::Medium, ValenceRank::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            ValenceRank::High => "high",
            ValenceRank::Medium => "medium",
            ValenceRank::Low => "low",
        }
    }
}

impl fmt::Display for ValenceRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ValenceRange {
    #[serde(rename = "7to9")]
    SevenToNine,
    #[serde(rename = "4to6")]
    FourToSix,
    #[serde(rename = "1to3")]
    OneToThree,
}

impl ValenceRange {
    pub const ALL: [ValenceRange; 3] = [
        ValenceRange::SevenToNine,
        ValenceRange::FourToSix,
        ValenceRange::OneToThree,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValenceRange::SevenToNine => "7to9",
            ValenceRange::FourToSix => "4to6",
            ValenceRange::OneToThree => "1to3",
        }
    }
}

impl fmt::Display for ValenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the reference dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReferenceRecord {
    #[serde(rename = "stimFile")]
    pub stimulus_id: String,
    pub valence_rank: ValenceRank,
    pub valence_range: ValenceRange,
    pub valence_mean: f64,
    pub arousal_mean: f64,
}

/// Reference records in load order, indexed by stimulus id.
///
/// When two rows share an id the first one loaded wins.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    records: Vec<ReferenceRecord>,
    index: HashMap<String, usize>,
}

impl ReferenceTable {
    pub fn from_records(records: Vec<ReferenceRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.contains_key(&record.stimulus_id) {
                warn!(stimulus = %record.stimulus_id, row = i, "Duplicate reference id ignored");
                continue;
            }
            index.insert(record.stimulus_id.clone(), i);
        }
        Self { records, index }
    }

    /// Reads the reference CSV at `path`.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::MissingReferenceData`] if the file cannot be opened,
    /// [`AnalysisError::InvalidReference`] if a row does not deserialize.
    pub fn load(path: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| AnalysisError::MissingReferenceData {
                path: path.to_path_buf(),
                source,
            })?;

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: ReferenceRecord =
                result.map_err(|source| AnalysisError::InvalidReference {
                    path: PathBuf::from(path),
                    source,
                })?;
            records.push(record);
        }

        let table = Self::from_records(records);
        info!(path = %path.display(), records = table.len(), "Reference table loaded");
        Ok(table)
    }

    /// Finds the record for a trial's stimulus file name, e.g. `1050.jpg`.
    pub fn lookup(&self, stimulus_file: &str) -> Option<&ReferenceRecord> {
        let id = stimulus_id(stimulus_file);
        let found = self.index.get(id).map(|&i| &self.records[i]);
        if found.is_none() {
            debug!(stimulus = stimulus_file, id, "No reference match");
        }
        found
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceRecord> {
        self.records.iter()
    }
}

/// Strips the file extension (text after the last `.`) from a stimulus file name.
pub fn stimulus_id(stimulus_file: &str) -> &str {
    stimulus_file
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(stimulus_file)
}
