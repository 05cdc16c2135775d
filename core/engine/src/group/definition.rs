//! FILENAME: core/engine/src/group/definition.rs
//! Group definition - the configuration of a grouped view.
//!
//! Grouping has no key of its own: a non-itemized card groups by its active
//! sort field and carries its visible columns into each aggregate row.

use serde::{Deserialize, Serialize};

/// Key label for rows whose key cell is missing or blank.
pub const EMPTY_GROUP_LABEL: &str = "(Sin Valor)";

/// Marker for a non-numeric column whose merged values disagree.
pub const VARIES_LABEL: &str = "<Varios>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDefinition {
    /// Field whose distinct values define the groups.
    pub key_field: String,
    /// Columns carried into each aggregate row, in display order.
    pub columns: Vec<String>,
}

impl GroupDefinition {
    pub fn new(key_field: impl Into<String>, columns: Vec<String>) -> Self {
        GroupDefinition {
            key_field: key_field.into(),
            columns,
        }
    }

    /// Columns of an aggregate row. The key field is always present,
    /// first when the visible set does not already place it.
    pub fn output_columns(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.columns.len() + 1);
        if !self.columns.iter().any(|c| *c == self.key_field) {
            out.push(&self.key_field);
        }
        out.extend(self.columns.iter().map(String::as_str));
        out
    }
}
