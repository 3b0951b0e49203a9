use std::cmp::Ordering;
use tracing::debug;

use crate::analyzers::types::{AnalysisBlock, strata};
use crate::analyzers::utility::mean;
use crate::config::ColumnLayout;
use crate::error::{AnalysisError, Result};
use crate::trials::{REF_VALENCE_MEAN, TrialTable};

/// Sorts trials by reference valence mean, highest first. Ties keep their
/// input order.
pub fn sort_trials(table: &mut TrialTable) -> Result<()> {
    let col = table.column(REF_VALENCE_MEAN)?;
    table.records_mut().sort_by(|a, b| {
        match (a.get(col).as_f64(), b.get(col).as_f64()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            _ => Ordering::Equal,
        }
    });
    Ok(())
}

/// Averages `field` over the trials whose `stratify_field` equals one of
/// `categories`, skipping missing values.
///
/// # Errors
///
/// [`AnalysisError::EmptyStratum`] if no values remain,
/// [`AnalysisError::NonNumeric`] if a non-missing value is not a number.
pub fn average(
    table: &TrialTable,
    field: &str,
    stratify_field: &str,
    categories: &[&str],
    block: &str,
) -> Result<f64> {
    let value_col = table.column(field)?;
    let group_col = table.column(stratify_field)?;

    let mut values = Vec::new();
    for record in table.records() {
        let in_group = record
            .get(group_col)
            .as_text()
            .is_some_and(|c| categories.contains(&c));
        if !in_group {
            continue;
        }

        let cell = record.get(value_col);
        if cell.is_missing() {
            continue;
        }
        match cell.as_f64() {
            Some(v) => values.push(v),
            None => {
                return Err(AnalysisError::NonNumeric {
                    column: field.to_string(),
                    value: cell.to_string(),
                });
            }
        }
    }

    mean(&values).ok_or_else(|| AnalysisError::EmptyStratum {
        block: block.to_string(),
        column: field.to_string(),
    })
}

/// Computes the summary table for a joined, coerced trial table: one
/// [`AnalysisBlock`] per stratum in fixed order.
pub fn summarize(table: &TrialTable, layout: &ColumnLayout) -> Result<Vec<AnalysisBlock>> {
    let columns = layout.response_columns();

    let mut blocks = Vec::new();
    for stratum in strata() {
        let mut averages = [0.0; 4];
        for (slot, (field, _)) in averages.iter_mut().zip(columns.iter()) {
            *slot = average(table, field, stratum.field, &stratum.categories, stratum.name)?;
        }
        debug!(block = stratum.name, ?averages, "Block averaged");
        blocks.push(AnalysisBlock::from_averages(stratum.name, averages));
    }

    Ok(blocks)
}
