//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Defines the value held by a single cell of an element table.
//! CONTEXT: Raw exports mix numbers and decorated strings ("120 m2", "$45.00").
//! A cell is either empty, a number, or text; formats never change this
//! representation (percent values are stored as fractions).

use serde::{Deserialize, Serialize};

use crate::numeric::parse_decorated;

/// Represents the raw or computed value within a cell.
/// Serialized untagged: numbers as JSON numbers, text as strings, empty as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// True for `Empty` and for text that is blank after trimming.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    /// Strict numeric view: numbers, or text that parses as a whole number
    /// after trimming. Decorated text ("12 m2") is not a number here.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellValue::Empty => None,
        }
    }

    /// Formula coercion: decorated text is read down to its number
    /// ("12 m2" -> 12); anything unparseable reads as 0.
    pub fn coerce_number(&self) -> f64 {
        match self {
            CellValue::Number(n) if n.is_finite() => *n,
            CellValue::Number(_) | CellValue::Empty => 0.0,
            CellValue::Text(s) => parse_decorated(s).unwrap_or(0.0),
        }
    }

    /// Text form used for filtering, grouping and string sorting.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_text())
    }
}
