//! FILENAME: core/engine/src/summary.rs
//! PURPOSE: Footer totals for the displayed rows and output-column rollups.
//! CONTEXT: Totals describe the final (sorted, possibly grouped) row set. Rollups
//! feed external summary tiles and are computed over filtered rows only, so
//! they do not move when the user sorts or toggles grouping.

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::config::FormatLocale;
use crate::format::format_number;
use crate::row::{IndexedRow, Row};

/// Footer cell for one column. `total` is None when the column cannot be totaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTotal {
    pub column: String,
    pub total: Option<f64>,
    pub display: String,
}

/// Aggregate of one output column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rollup {
    pub column: String,
    pub value: f64,
}

/// Sum of `column` when every row holds a number there, else None.
pub fn column_total(rows: &[Row], column: &Column) -> Option<f64> {
    if !column.format.is_numeric() {
        return None;
    }
    rows.iter()
        .map(|row| row.value(&column.name).as_number())
        .sum::<Option<f64>>()
}

/// One footer cell per column, in the order given.
pub fn column_totals(rows: &[Row], columns: &[Column], locale: &FormatLocale) -> Vec<ColumnTotal> {
    columns
        .iter()
        .map(|column| {
            let total = column_total(rows, column);
            let display = total
                .map(|t| format_number(t, column.format, locale))
                .unwrap_or_default();
            ColumnTotal {
                column: column.name.clone(),
                total,
                display,
            }
        })
        .collect()
}

/// Sum of the numeric values of each output column over `filtered` rows.
/// Non-numeric cells are skipped.
pub fn output_rollups(filtered: &[IndexedRow], output_columns: &[String]) -> Vec<Rollup> {
    output_columns
        .iter()
        .map(|column| Rollup {
            column: column.clone(),
            value: filtered
                .iter()
                .filter_map(|r| r.row.value(column).as_number())
                .sum(),
        })
        .collect()
}
