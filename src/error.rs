//! Error kinds raised while analyzing trial files.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(
        "{} was not found or could not be read. Place it in the working directory \
         (or point --reference / IAPS_REFERENCE at it) and try again",
        .path.display()
    )]
    MissingReferenceData {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid reference row in {}: {source}", .path.display())]
    InvalidReference {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no reference record for stimulus {stimulus:?} in {}", .path.display())]
    StimulusNotFound { stimulus: String, path: PathBuf },

    #[error("no values to average for {column} in the {block} block")]
    EmptyStratum { block: String, column: String },

    #[error("column {column:?} is missing from {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("column {column} holds non-numeric value {value:?}")]
    NonNumeric { column: String, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl AnalysisError {
    /// Whether the batch runner may skip the offending file and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalysisError::EmptyStratum { .. })
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_empty_stratum_is_recoverable() {
        let empty = AnalysisError::EmptyStratum {
            block: "high".into(),
            column: "Valence_key.rt".into(),
        };
        let missing = AnalysisError::StimulusNotFound {
            stimulus: "1050".into(),
            path: PathBuf::from("p01.csv"),
        };

        assert!(empty.is_recoverable());
        assert!(!missing.is_recoverable());
    }

    #[test]
    fn test_missing_reference_message_has_guidance() {
        let source = csv::Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = AnalysisError::MissingReferenceData {
            path: PathBuf::from("IAPS_REFERENCE.csv"),
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("IAPS_REFERENCE.csv"));
        assert!(msg.contains("working directory"));
    }
}
