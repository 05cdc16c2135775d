//! FILENAME: core/engine/src/sort.rs
//! PURPOSE: Sort Engine. Orders rows by a single field.
//! CONTEXT: Values that both read as numbers compare numerically; everything
//! else compares by a collation key (accents folded, case folded) so that
//! Spanish labels order the way a reader expects. A value that reads as a
//! number always sorts before one that does not, which keeps the comparator
//! a total order on mixed columns.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::cell::CellValue;
use crate::numeric::parse_float_prefix;
use crate::row::IndexedRow;

/// The single active sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub ascending: bool,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        SortSpec {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        SortSpec {
            field: field.into(),
            ascending: false,
        }
    }
}

fn numeric_view(value: &CellValue) -> Option<f64> {
    let n = match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => parse_float_prefix(s),
        CellValue::Empty => None,
    };
    n.filter(|n| n.is_finite())
}

/// Accent- and case-insensitive key: "Árbol" -> "arbol".
pub fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Ascending order of two cell values.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (numeric_view(a), numeric_view(b)) {
        (Some(x), Some(y)) => return x.total_cmp(&y),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => {}
    }

    let (a, b) = (a.display_text(), b.display_text());
    collation_key(&a)
        .cmp(&collation_key(&b))
        .then_with(|| a.cmp(&b))
}

/// Sorted copy of `rows`. With no sort key the incoming order is kept.
pub fn apply_sort(rows: &[IndexedRow], sort: Option<&SortSpec>) -> Vec<IndexedRow> {
    let mut sorted = rows.to_vec();
    let Some(spec) = sort else {
        return sorted;
    };

    sorted.sort_by(|x, y| {
        let ord = compare_values(x.row.value(&spec.field), y.row.value(&spec.field));
        if spec.ascending {
            ord
        } else {
            ord.reverse()
        }
    });
    sorted
}
