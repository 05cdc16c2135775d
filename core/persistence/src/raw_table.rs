//! FILENAME: core/persistence/src/raw_table.rs

use engine::{discover_columns, Row};
use serde::{Deserialize, Serialize};

/// An element table as exported by a modeling tool, before normalization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTable {
    /// Every column seen, in first-appearance order.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RawTable {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        RawTable {
            columns: discover_columns(&rows),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
