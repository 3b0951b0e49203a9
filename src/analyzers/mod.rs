//! Stratified aggregation of joined trials.
//!
//! Trials are sorted by normative valence, then averaged per stratum: one
//! block over every trial, one per valence rank and one per valence range.

pub mod aggregate;
pub mod types;
pub mod utility;
