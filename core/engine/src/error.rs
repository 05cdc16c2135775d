//! FILENAME: core/engine/src/error.rs

use thiserror::Error;

/// Why a cell edit was refused. A refused edit never mutates the card.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Cannot edit cells while rows are grouped; switch to itemized view first")]
    GroupedView,

    #[error("Row {index} is out of range (card has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column '{0}' is computed by a formula and cannot be edited")]
    DerivedColumn(String),
}

/// Card configuration errors (columns, formulas, output flags).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CardError {
    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Name must not be empty")]
    EmptyName,
}

/// Invalid normalizer configuration.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid unit pattern: {0}")]
    InvalidUnitPattern(#[from] regex::Error),

    #[error("Threshold must be within 0..=1, got {0}")]
    InvalidThreshold(f64),

    #[error("Sample size must be at least 1")]
    InvalidSampleSize,
}
