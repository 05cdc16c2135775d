//! FILENAME: core/engine/src/column.rs
//! PURPOSE: Column metadata: name plus display format.
//! CONTEXT: The format is metadata only. Stored values never change with it,
//! except that percent columns always hold decimal fractions (0.10 = 10%).

use serde::{Deserialize, Serialize};

/// Display format of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnFormat {
    Text,
    #[default]
    Number,
    Currency,
    Percent,
    Weight,
}

impl ColumnFormat {
    /// Formats whose values are meant to be numbers.
    pub fn is_numeric(self) -> bool {
        !matches!(self, ColumnFormat::Text)
    }
}

impl std::fmt::Display for ColumnFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnFormat::Text => "text",
            ColumnFormat::Number => "number",
            ColumnFormat::Currency => "currency",
            ColumnFormat::Percent => "percent",
            ColumnFormat::Weight => "weight",
        };
        write!(f, "{}", name)
    }
}

/// A named column of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub format: ColumnFormat,
}

impl Column {
    pub fn new(name: impl Into<String>, format: ColumnFormat) -> Self {
        Column {
            name: name.into(),
            format,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Column::new(name, ColumnFormat::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Column::new(name, ColumnFormat::Number)
    }
}
