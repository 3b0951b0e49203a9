pub mod analyzers;
pub mod batch;
pub mod coerce;
pub mod config;
pub mod discover;
pub mod error;
pub mod output;
pub mod reference;
pub mod trials;
