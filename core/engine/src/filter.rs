//! FILENAME: core/engine/src/filter.rs
//! PURPOSE: Filter Engine. Keeps rows for which every predicate matches.
//! CONTEXT: The operator is chosen explicitly per predicate. String operators
//! compare case-insensitively on the cell's text form; `gt`/`lt` read both
//! sides as numbers and fail the predicate when either side does not parse.

use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::numeric::parse_float_prefix;
use crate::row::{IndexedRow, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Contains,
    Equals,
    StartsWith,
    Gt,
    Lt,
    /// Any operator this version does not know. Always passes.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterPredicate {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        FilterPredicate {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.value(&self.field);
        match self.operator {
            FilterOperator::Contains => fold(cell).contains(&self.value.to_lowercase()),
            FilterOperator::Equals => fold(cell) == self.value.to_lowercase(),
            FilterOperator::StartsWith => fold(cell).starts_with(&self.value.to_lowercase()),
            FilterOperator::Gt => compare_numeric(cell, &self.value, |a, b| a > b),
            FilterOperator::Lt => compare_numeric(cell, &self.value, |a, b| a < b),
            FilterOperator::Unknown => true,
        }
    }
}

fn fold(cell: &CellValue) -> String {
    cell.display_text().to_lowercase()
}

fn compare_numeric(cell: &CellValue, value: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    let left = match cell {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => parse_float_prefix(s),
        CellValue::Empty => None,
    };
    match (left, parse_float_prefix(value)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Rows matching every predicate, in their incoming order.
pub fn apply_filters(rows: &[IndexedRow], filters: &[FilterPredicate]) -> Vec<IndexedRow> {
    rows.iter()
        .filter(|r| filters.iter().all(|f| f.matches(&r.row)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str, area: f64) -> Row {
        Row::from_iter([
            ("Type", CellValue::text(kind)),
            ("Area", CellValue::Number(area)),
        ])
    }

    #[test]
    fn string_operators_ignore_case() {
        let r = row("Muro Básico", 1.0);
        assert!(FilterPredicate::new("Type", FilterOperator::Contains, "BÁSICO").matches(&r));
        assert!(FilterPredicate::new("Type", FilterOperator::Equals, "muro básico").matches(&r));
        assert!(FilterPredicate::new("Type", FilterOperator::StartsWith, "mu").matches(&r));
        assert!(!FilterPredicate::new("Type", FilterOperator::StartsWith, "básico").matches(&r));
    }

    #[test]
    fn missing_cell_is_empty_string() {
        let r = row("Wall", 1.0);
        assert!(FilterPredicate::new("Level", FilterOperator::Equals, "").matches(&r));
        assert!(!FilterPredicate::new("Level", FilterOperator::Contains, "1").matches(&r));
    }

    #[test]
    fn numeric_operators_parse_both_sides() {
        let r = row("Wall", 15.0);
        assert!(FilterPredicate::new("Area", FilterOperator::Gt, "10").matches(&r));
        assert!(!FilterPredicate::new("Area", FilterOperator::Lt, "10").matches(&r));

        let decorated = Row::from_iter([("Area", "12 m2")]);
        assert!(FilterPredicate::new("Area", FilterOperator::Gt, "11.5").matches(&decorated));
    }

    #[test]
    fn unparseable_numeric_side_does_not_match() {
        let r = row("Wall", 15.0);
        assert!(!FilterPredicate::new("Area", FilterOperator::Gt, "ten").matches(&r));
        assert!(!FilterPredicate::new("Type", FilterOperator::Lt, "100").matches(&r));
        assert!(!FilterPredicate::new("Missing", FilterOperator::Gt, "0").matches(&r));
    }

    #[test]
    fn unknown_operator_passes() {
        let p: FilterPredicate =
            serde_json::from_str(r#"{"field":"Type","operator":"regex","value":"x"}"#).unwrap();
        assert_eq!(p.operator, FilterOperator::Unknown);
        assert!(p.matches(&row("Door", 1.0)));
    }

    #[test]
    fn operator_serializes_lowercase() {
        let json = serde_json::to_string(&FilterOperator::StartsWith).unwrap();
        assert_eq!(json, "\"startswith\"");
    }

    #[test]
    fn predicates_are_anded() {
        let filters = vec![
            FilterPredicate::new("Type", FilterOperator::Equals, "Wall"),
            FilterPredicate::new("Area", FilterOperator::Gt, "10"),
        ];
        let rows = IndexedRow::enumerate(&[row("Wall", 15.0), row("Wall", 5.0), row("Door", 15.0)]);
        let kept = apply_filters(&rows, &filters);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_index, 0);
    }

    #[test]
    fn no_filters_keeps_everything() {
        let rows = IndexedRow::enumerate(&[row("Wall", 1.0), row("Door", 2.0)]);
        assert_eq!(apply_filters(&rows, &[]), rows);
    }
}
