//! Reading trial logs, dropping practice trials, and joining each trial
//! against the reference table.
//!
//! The input schema is whatever the file header says. Rows are kept as
//! cells aligned with [`TrialTable::header`], so unknown columns survive
//! untouched into the sorted output.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::coerce::{Cell, coerce};
use crate::config::ColumnLayout;
use crate::error::{AnalysisError, Result};
use crate::reference::ReferenceTable;

pub const REF_VALENCE_RANK: &str = "ref_valence_rank";
pub const REF_VALENCE_RANGE: &str = "ref_valence_range";
pub const REF_VALENCE_MEAN: &str = "ref_valence_mean";
pub const REF_AROUSAL_MEAN: &str = "ref_arousal_mean";

/// Injected reference columns, in output order.
pub const REF_COLUMNS: [&str; 4] = [
    REF_VALENCE_RANK,
    REF_VALENCE_RANGE,
    REF_VALENCE_MEAN,
    REF_AROUSAL_MEAN,
];

/// Header position the reference columns are inserted at.
const REF_INSERT_AT: usize = 1;

/// A trial log as read from disk, before filtering and joining.
#[derive(Debug, Clone)]
pub struct RawTrials {
    pub source: PathBuf,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTrials {
    /// Reads a trial CSV. Short rows are padded with empty strings and long
    /// rows truncated to the header width.
    pub fn read(path: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let mut row: Vec<String> = record.iter().take(header.len()).map(str::to_string).collect();
            row.resize(header.len(), String::new());
            rows.push(row);
        }

        debug!(path = %path.display(), columns = header.len(), rows = rows.len(), "Trial file read");
        Ok(Self {
            source: path.to_path_buf(),
            header,
            rows,
        })
    }

    fn column(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalysisError::MissingColumn {
                column: name.to_string(),
                path: self.source.clone(),
            })
    }

    /// Stimulus file names of all non-practice trials that have no
    /// reference record, in row order, without duplicates.
    pub fn uncovered_stimuli(&self, reference: &ReferenceTable, layout: &ColumnLayout) -> Result<Vec<String>> {
        let rep = self.column(&layout.repetition)?;
        let stim = self.column(&layout.stimulus)?;

        let mut missing: Vec<String> = Vec::new();
        for row in self.rows.iter().filter(|r| !r[rep].is_empty()) {
            if reference.lookup(&row[stim]).is_none() && !missing.contains(&row[stim]) {
                missing.push(row[stim].clone());
            }
        }
        Ok(missing)
    }
}

/// One non-practice trial, cells aligned with its table's header.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    cells: Vec<Cell>,
}

impl TrialRecord {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, column: usize) -> &Cell {
        &self.cells[column]
    }
}

/// Joined trials of one input file.
#[derive(Debug, Clone)]
pub struct TrialTable {
    source: PathBuf,
    header: Vec<String>,
    columns: HashMap<String, usize>,
    records: Vec<TrialRecord>,
}

impl TrialTable {
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut Vec<TrialRecord> {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of a column, failing with [`AnalysisError::MissingColumn`].
    pub fn column(&self, name: &str) -> Result<usize> {
        self.columns
            .get(name)
            .copied()
            .ok_or_else(|| AnalysisError::MissingColumn {
                column: name.to_string(),
                path: self.source.clone(),
            })
    }

    /// Converts the four response columns in place. Values a converter
    /// rejects stay as their original text.
    pub fn coerce_responses(&mut self, layout: &ColumnLayout) -> Result<()> {
        for (name, converter) in layout.response_columns() {
            let col = self.column(name)?;
            for record in &mut self.records {
                if let Cell::Text(raw) = &record.cells[col] {
                    let coerced = coerce(raw, converter).into_cell();
                    record.cells[col] = coerced;
                }
            }
        }
        Ok(())
    }
}

/// Drops practice trials and attaches reference data to every remaining
/// trial.
///
/// The four reference columns are inserted at header position 1; all other
/// columns keep their relative order.
///
/// # Errors
///
/// [`AnalysisError::MissingColumn`] if the repetition or stimulus column is
/// absent, [`AnalysisError::StimulusNotFound`] if a trial's stimulus has no
/// reference record.
pub fn join(raw: RawTrials, reference: &ReferenceTable, layout: &ColumnLayout) -> Result<TrialTable> {
    let rep = raw.column(&layout.repetition)?;
    let stim = raw.column(&layout.stimulus)?;
    let insert_at = REF_INSERT_AT.min(raw.header.len());

    let total = raw.rows.len();
    let mut records = Vec::with_capacity(total);
    for row in raw.rows.into_iter().filter(|r| !r[rep].is_empty()) {
        let found = reference
            .lookup(&row[stim])
            .ok_or_else(|| AnalysisError::StimulusNotFound {
                stimulus: row[stim].clone(),
                path: raw.source.clone(),
            })?;

        let mut cells: Vec<Cell> = row.into_iter().map(Cell::Text).collect();
        let injected = [
            Cell::Text(found.valence_rank.to_string()),
            Cell::Text(found.valence_range.to_string()),
            Cell::Float(found.valence_mean),
            Cell::Float(found.arousal_mean),
        ];
        for (offset, cell) in injected.into_iter().enumerate() {
            cells.insert(insert_at + offset, cell);
        }
        records.push(TrialRecord { cells });
    }

    let mut header = raw.header;
    for (offset, name) in REF_COLUMNS.iter().enumerate() {
        header.insert(insert_at + offset, name.to_string());
    }
    let columns = header
        .iter()
        .enumerate()
        .rev()
        .map(|(i, name)| (name.clone(), i))
        .collect();

    debug!(
        path = %raw.source.display(),
        trials = records.len(),
        practice = total - records.len(),
        "Trials joined"
    );

    Ok(TrialTable {
        source: raw.source,
        header,
        columns,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{ReferenceRecord, ValenceRange, ValenceRank};

    fn reference() -> ReferenceTable {
        ReferenceTable::from_records(vec![
            ReferenceRecord {
                stimulus_id: "1050".into(),
                valence_rank: ValenceRank::Low,
                valence_range: ValenceRange::OneToThree,
                valence_mean: 3.46,
                arousal_mean: 6.87,
            },
            ReferenceRecord {
                stimulus_id: "1460".into(),
                valence_rank: ValenceRank::High,
                valence_range: ValenceRange::SevenToNine,
                valence_mean: 8.21,
                arousal_mean: 4.31,
            },
        ])
    }

    fn raw(rows: &[[&str; 6]]) -> RawTrials {
        RawTrials {
            source: PathBuf::from("p01.csv"),
            header: [
                "stimFile",
                "trials.thisRepN",
                "Valence_key.keys",
                "Valence_key.rt",
                "Arousal_key.keys",
                "Arousal_key.rt",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_join_inserts_reference_columns_at_position_one() {
        let table = join(
            raw(&[["1460.jpg", "0", "7", "1.2", "k", "0.9"]]),
            &reference(),
            &ColumnLayout::default(),
        )
        .unwrap();

        assert_eq!(
            table.header(),
            &[
                "stimFile",
                "ref_valence_rank",
                "ref_valence_range",
                "ref_valence_mean",
                "ref_arousal_mean",
                "trials.thisRepN",
                "Valence_key.keys",
                "Valence_key.rt",
                "Arousal_key.keys",
                "Arousal_key.rt",
            ]
        );
        let row = &table.records()[0];
        assert_eq!(row.get(1), &Cell::Text("high".into()));
        assert_eq!(row.get(2), &Cell::Text("7to9".into()));
        assert_eq!(row.get(3), &Cell::Float(8.21));
        assert_eq!(row.get(4), &Cell::Float(4.31));
        assert_eq!(row.get(0), &Cell::Text("1460.jpg".into()));
    }

    #[test]
    fn test_join_drops_practice_trials() {
        let table = join(
            raw(&[
                ["1460.jpg", "", "7", "1.2", "k", "0.9"],
                ["1050.jpg", "0", "2", "1.1", "d", "0.7"],
                ["1460.jpg", "", "7", "1.2", "k", "0.9"],
            ]),
            &reference(),
            &ColumnLayout::default(),
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].get(0), &Cell::Text("1050.jpg".into()));
    }

    #[test]
    fn test_practice_trial_with_unknown_stimulus_is_ignored() {
        let table = join(
            raw(&[["practice.jpg", "", "", "", "", ""]]),
            &reference(),
            &ColumnLayout::default(),
        )
        .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_join_unknown_stimulus_fails() {
        let err = join(
            raw(&[["9999.jpg", "0", "7", "1.2", "k", "0.9"]]),
            &reference(),
            &ColumnLayout::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::StimulusNotFound { ref stimulus, .. } if stimulus == "9999.jpg"));
    }

    #[test]
    fn test_join_missing_repetition_column() {
        let mut trials = raw(&[]);
        trials.header[1] = "something_else".into();
        let err = join(trials, &reference(), &ColumnLayout::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn { ref column, .. } if column == "trials.thisRepN"));
    }

    #[test]
    fn test_coerce_responses() {
        let mut table = join(
            raw(&[
                ["1460.jpg", "0", "7", "1.2", "D", "0.9"],
                ["1050.jpg", "1", "None", "oops", "z", ""],
            ]),
            &reference(),
            &ColumnLayout::default(),
        )
        .unwrap();
        table.coerce_responses(&ColumnLayout::default()).unwrap();

        let vk = table.column("Valence_key.keys").unwrap();
        let vrt = table.column("Valence_key.rt").unwrap();
        let ak = table.column("Arousal_key.keys").unwrap();
        let art = table.column("Arousal_key.rt").unwrap();

        let first = &table.records()[0];
        assert_eq!(first.get(vk), &Cell::Int(7));
        assert_eq!(first.get(vrt), &Cell::Float(1.2));
        assert_eq!(first.get(ak), &Cell::Int(3));
        assert_eq!(first.get(art), &Cell::Float(0.9));

        let second = &table.records()[1];
        assert_eq!(second.get(vk), &Cell::Text("None".into()));
        assert_eq!(second.get(vrt), &Cell::Text("oops".into()));
        assert_eq!(second.get(ak), &Cell::Empty);
        assert_eq!(second.get(art), &Cell::Text(String::new()));
    }

    #[test]
    fn test_uncovered_stimuli() {
        let trials = raw(&[
            ["9999.jpg", "0", "", "", "", ""],
            ["1050.jpg", "0", "", "", "", ""],
            ["9999.jpg", "1", "", "", "", ""],
            ["8888.jpg", "", "", "", "", ""],
        ]);
        let missing = trials
            .uncovered_stimuli(&reference(), &ColumnLayout::default())
            .unwrap();
        assert_eq!(missing, vec!["9999.jpg".to_string()]);
    }
}
