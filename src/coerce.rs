//! Typed cell values and the response-field converters.
//!
//! Conversion never fails loudly: a value the converter rejects is kept as
//! its original text, see [`Coerced::Unchanged`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single value of a trial row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Defined "no value", e.g. a key press outside the rating layout.
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
}

impl Cell {
    /// Absent, empty, or the literal `None` marker left by the recorder.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty() || s == "None",
            Cell::Int(_) | Cell::Float(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(n) => Some(*n as f64),
            Cell::Float(f) => Some(*f),
            Cell::Empty | Cell::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Int(n) => write!(f, "{n}"),
            // Debug keeps the fractional part on whole numbers ("1.0", not "1").
            Cell::Float(x) => write!(f, "{x:?}"),
        }
    }
}

/// How a raw response string is turned into a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Converter {
    /// Letter on the 9-key rating row (`a`..`l`) to its rank 1-9.
    RankKey,
    Integer,
    Float,
}

/// Keyboard row used for ratings; position + 1 is the rank.
const RATING_KEYS: [char; 9] = ['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l'];

impl Converter {
    /// Returns `None` when the input cannot be converted.
    pub fn convert(self, raw: &str) -> Option<Cell> {
        match self {
            Converter::RankKey => Some(rank_code(raw)),
            Converter::Integer => raw.trim().parse::<i64>().ok().map(Cell::Int),
            Converter::Float => raw.trim().parse::<f64>().ok().map(Cell::Float),
        }
    }
}

/// Maps a key press to its rank. Anything off the layout is [`Cell::Empty`].
pub fn rank_code(raw: &str) -> Cell {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => RATING_KEYS
            .iter()
            .position(|k| *k == c.to_ascii_lowercase())
            .map(|i| Cell::Int(i as i64 + 1))
            .unwrap_or(Cell::Empty),
        _ => Cell::Empty,
    }
}

/// Outcome of [`coerce`].
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Converted(Cell),
    /// The converter rejected the value; the original text is kept.
    Unchanged(String),
}

impl Coerced {
    pub fn into_cell(self) -> Cell {
        match self {
            Coerced::Converted(cell) => cell,
            Coerced::Unchanged(raw) => Cell::Text(raw),
        }
    }
}

pub fn coerce(raw: &str, converter: Converter) -> Coerced {
    match converter.convert(raw) {
        Some(cell) => Coerced::Converted(cell),
        None => Coerced::Unchanged(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_key_is_case_insensitive() {
        assert_eq!(rank_code("D"), Cell::Int(3));
        assert_eq!(rank_code("d"), Cell::Int(3));
        assert_eq!(rank_code("a"), Cell::Int(1));
        assert_eq!(rank_code("L"), Cell::Int(9));
    }

    #[test]
    fn test_unmapped_key_is_empty_not_fallback() {
        assert_eq!(coerce("z", Converter::RankKey), Coerced::Converted(Cell::Empty));
        assert_eq!(coerce("", Converter::RankKey), Coerced::Converted(Cell::Empty));
        assert_eq!(coerce("dd", Converter::RankKey), Coerced::Converted(Cell::Empty));
    }

    #[test]
    fn test_numeric_garbage_falls_back_unchanged() {
        assert_eq!(
            coerce("abc", Converter::Float),
            Coerced::Unchanged("abc".to_string())
        );
        assert_eq!(
            coerce("None", Converter::Integer),
            Coerced::Unchanged("None".to_string())
        );
        assert_eq!(coerce("", Converter::Float).into_cell(), Cell::Text(String::new()));
    }

    #[test]
    fn test_numeric_parse() {
        assert_eq!(coerce("7", Converter::Integer).into_cell(), Cell::Int(7));
        assert_eq!(coerce("0.825", Converter::Float).into_cell(), Cell::Float(0.825));
        assert_eq!(
            coerce("7.5", Converter::Integer),
            Coerced::Unchanged("7.5".to_string())
        );
    }

    #[test]
    fn test_missing_markers() {
        assert!(Cell::Empty.is_missing());
        assert!(Cell::Text(String::new()).is_missing());
        assert!(Cell::Text("None".into()).is_missing());
        assert!(!Cell::Text("abc".into()).is_missing());
        assert!(!Cell::Int(0).is_missing());
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::Float(1.0).to_string(), "1.0");
        assert_eq!(Cell::Float(0.25).to_string(), "0.25");
        assert_eq!(Cell::Int(4).to_string(), "4");
        assert_eq!(Cell::Empty.to_string(), "");
    }
}
