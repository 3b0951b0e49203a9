//! Data types used by the aggregation step.

use serde::Serialize;

use crate::reference::{ValenceRange, ValenceRank};
use crate::trials::{REF_VALENCE_RANGE, REF_VALENCE_RANK};

/// One row of the summary table: averages over a single stratum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisBlock {
    #[serde(rename = "valence_block")]
    pub name: String,
    pub avg_valence_rating: f64,
    pub avg_valence_rt: f64,
    pub avg_arousal_rating: f64,
    pub avg_arousal_rt: f64,
}

impl AnalysisBlock {
    /// Builds a block from the four averages in summary column order.
    pub fn from_averages(name: &str, averages: [f64; 4]) -> Self {
        let [avg_valence_rating, avg_valence_rt, avg_arousal_rating, avg_arousal_rt] = averages;
        Self {
            name: name.to_string(),
            avg_valence_rating,
            avg_valence_rt,
            avg_arousal_rating,
            avg_arousal_rt,
        }
    }
}

/// A named subset of trials: those whose `field` holds one of `categories`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stratum {
    pub name: &'static str,
    pub field: &'static str,
    pub categories: Vec<&'static str>,
}

/// The fixed stratification plan, in summary row order:
/// all, high, medium, low, 7to9, 4to6, 1to3.
pub fn strata() -> Vec<Stratum> {
    let mut plan = vec![Stratum {
        name: "all",
        field: REF_VALENCE_RANK,
        categories: ValenceRank::ALL.iter().map(|r| r.as_str()).collect(),
    }];

    plan.extend(ValenceRank::ALL.iter().map(|r| Stratum {
        name: r.as_str(),
        field: REF_VALENCE_RANK,
        categories: vec![r.as_str()],
    }));

    plan.extend(ValenceRange::ALL.iter().map(|r| Stratum {
        name: r.as_str(),
        field: REF_VALENCE_RANGE,
        categories: vec![r.as_str()],
    }));

    plan
}
