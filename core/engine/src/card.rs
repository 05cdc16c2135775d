//! FILENAME: core/engine/src/card.rs
//! PURPOSE: The Card (dataset) model: source rows plus the configuration that
//! turns them into a governed summary line.
//! CONTEXT: A card is created once by `Card::ingest`, which runs the Column
//! Normalizer. Afterwards source rows change only through `edit_cell`; every
//! other mutator changes configuration and the caller re-runs the pipeline.
//! Formula results are never stored in `rows`, they are recomputed per run.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cell::CellValue;
use crate::column::{Column, ColumnFormat};
use crate::config::NormalizerConfig;
use crate::error::{CardError, ConfigError, EditError};
use crate::filter::FilterPredicate;
use crate::formula::{FormulaColumn, FormulaSpec};
use crate::normalize::{normalize_rows, NormalizationReport, SampledClassifier};
use crate::numeric::parse_decorated;
use crate::row::{discover_columns, IndexedRow, Row};
use crate::sort::SortSpec;

fn default_itemize() -> bool {
    true
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    pub rows: Vec<Row>,
    /// Every known column, source columns first, then formula columns.
    pub columns: Vec<Column>,
    pub visible_columns: Vec<String>,
    #[serde(default)]
    pub formulas: FormulaSpec,
    #[serde(default)]
    pub filters: Vec<FilterPredicate>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default = "default_itemize")]
    pub itemize: bool,
    #[serde(default)]
    pub output_columns: Vec<String>,
    pub created_at: String,
    pub modified_at: String,
}

impl Card {
    /// Builds a card from raw rows. Runs the normalizer once; converted columns
    /// get the `Number` format and everything else `Text`. An empty suggestion
    /// makes every column visible.
    pub fn ingest(
        name: impl Into<String>,
        mut rows: Vec<Row>,
        suggested_visible: &[String],
        config: &NormalizerConfig,
    ) -> Result<(Card, NormalizationReport), ConfigError> {
        let classifier = SampledClassifier::new(config)?;
        let report = normalize_rows(&mut rows, &classifier);

        let columns: Vec<Column> = discover_columns(&rows)
            .into_iter()
            .map(|name| {
                let format = if report.was_converted(&name) {
                    ColumnFormat::Number
                } else {
                    ColumnFormat::Text
                };
                Column::new(name, format)
            })
            .collect();

        let mut visible_columns: Vec<String> = Vec::new();
        for name in suggested_visible {
            if columns.iter().any(|c| c.name == *name) && !visible_columns.contains(name) {
                visible_columns.push(name.clone());
            }
        }
        if visible_columns.is_empty() {
            visible_columns = columns.iter().map(|c| c.name.clone()).collect();
        }

        let timestamp = now();
        let card = Card {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            rows,
            columns,
            visible_columns,
            formulas: Vec::new(),
            filters: Vec::new(),
            sort: None,
            itemize: true,
            output_columns: Vec::new(),
            created_at: timestamp.clone(),
            modified_at: timestamp,
        };
        Ok((card, report))
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn is_formula_column(&self, name: &str) -> bool {
        self.formulas.iter().any(|f| f.name == name)
    }

    pub fn is_output_column(&self, name: &str) -> bool {
        self.output_columns.iter().any(|c| c == name)
    }

    /// Visible columns with their formats, in display order.
    pub fn display_columns(&self) -> Vec<Column> {
        self.visible_columns
            .iter()
            .filter_map(|name| self.column(name).cloned())
            .collect()
    }

    /// Source rows numbered by position.
    pub fn indexed_rows(&self) -> Vec<IndexedRow> {
        IndexedRow::enumerate(&self.rows)
    }

    /// True when the displayed view collapses rows by the sort field.
    pub fn is_grouped(&self) -> bool {
        !self.itemize && self.sort.is_some()
    }

    fn require_column(&self, name: &str) -> Result<(), CardError> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(CardError::UnknownColumn(name.to_string()))
        }
    }

    fn touch(&mut self) {
        self.modified_at = now();
    }

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), CardError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CardError::EmptyName);
        }
        self.name = name;
        self.touch();
        Ok(())
    }

    /// Adds a formula column, or replaces the expression of an existing one.
    /// New formula columns are numeric and become visible.
    pub fn set_formula(
        &mut self,
        name: impl Into<String>,
        expression: impl Into<String>,
    ) -> Result<(), CardError> {
        let name = name.into();
        let expression = expression.into();
        if name.trim().is_empty() {
            return Err(CardError::EmptyName);
        }

        if let Some(existing) = self.formulas.iter_mut().find(|f| f.name == name) {
            existing.expression = expression;
        } else {
            if self.has_column(&name) {
                return Err(CardError::DuplicateColumn(name));
            }
            self.formulas.push(FormulaColumn::new(name.clone(), expression));
            self.columns.push(Column::number(name.clone()));
            self.visible_columns.push(name);
        }
        self.touch();
        Ok(())
    }

    /// Drops a formula column and every reference to it in the view config.
    pub fn remove_formula(&mut self, name: &str) -> Result<(), CardError> {
        if !self.is_formula_column(name) {
            return Err(CardError::UnknownColumn(name.to_string()));
        }
        self.formulas.retain(|f| f.name != name);
        self.columns.retain(|c| c.name != name);
        self.visible_columns.retain(|c| c != name);
        self.output_columns.retain(|c| c != name);
        self.filters.retain(|f| f.field != name);
        if self.sort.as_ref().is_some_and(|s| s.field == name) {
            self.sort = None;
        }
        self.touch();
        Ok(())
    }

    pub fn set_filters(&mut self, filters: Vec<FilterPredicate>) -> Result<(), CardError> {
        for filter in &filters {
            self.require_column(&filter.field)?;
        }
        self.filters = filters;
        self.touch();
        Ok(())
    }

    pub fn add_filter(&mut self, filter: FilterPredicate) -> Result<(), CardError> {
        self.require_column(&filter.field)?;
        self.filters.push(filter);
        self.touch();
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.touch();
    }

    pub fn set_sort(&mut self, sort: SortSpec) -> Result<(), CardError> {
        self.require_column(&sort.field)?;
        self.sort = Some(sort);
        self.touch();
        Ok(())
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.touch();
    }

    pub fn set_itemize(&mut self, itemize: bool) {
        self.itemize = itemize;
        self.touch();
    }

    pub fn set_visible_columns(&mut self, columns: Vec<String>) -> Result<(), CardError> {
        for (i, name) in columns.iter().enumerate() {
            self.require_column(name)?;
            if columns[..i].contains(name) {
                return Err(CardError::DuplicateColumn(name.clone()));
            }
        }
        self.visible_columns = columns;
        self.touch();
        Ok(())
    }

    pub fn set_column_format(&mut self, name: &str, format: ColumnFormat) -> Result<(), CardError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| CardError::UnknownColumn(name.to_string()))?;
        column.format = format;
        self.touch();
        Ok(())
    }

    /// Marks or unmarks a column for rollup into the card's summary line.
    pub fn set_output_column(&mut self, name: &str, output: bool) -> Result<(), CardError> {
        self.require_column(name)?;
        let present = self.is_output_column(name);
        if output && !present {
            self.output_columns.push(name.to_string());
        } else if !output && present {
            self.output_columns.retain(|c| c != name);
        }
        self.touch();
        Ok(())
    }

    // ========================================================================
    // EDITING
    // ========================================================================

    /// Writes user input into a source cell and returns the stored value.
    /// Refused while rows are grouped, and for formula columns.
    pub fn edit_cell(
        &mut self,
        source_index: usize,
        column: &str,
        input: &str,
    ) -> Result<CellValue, EditError> {
        if !self.itemize {
            return Err(EditError::GroupedView);
        }
        let len = self.rows.len();
        if source_index >= len {
            return Err(EditError::RowOutOfRange {
                index: source_index,
                len,
            });
        }
        if self.is_formula_column(column) {
            return Err(EditError::DerivedColumn(column.to_string()));
        }
        let format = self
            .column(column)
            .map(|c| c.format)
            .ok_or_else(|| EditError::UnknownColumn(column.to_string()))?;

        let value = parse_entry(input, format);
        self.rows[source_index].set(column, value.clone());
        self.touch();
        Ok(value)
    }
}

/// Interprets typed input for a column of the given format.
fn parse_entry(input: &str, format: ColumnFormat) -> CellValue {
    if format == ColumnFormat::Text {
        return CellValue::text(input);
    }
    if input.trim().is_empty() {
        return CellValue::Empty;
    }
    let parsed = match format {
        ColumnFormat::Percent => parse_percent_entry(input),
        _ => parse_decorated(input),
    };
    parsed.map_or_else(|| CellValue::text(input), CellValue::Number)
}

/// Reads a percent entry as a stored fraction. An explicit `%` always
/// divides by 100; otherwise magnitudes above 1 are read as points and the
/// rest as fractions, so "50" and "0.5" both give 0.5 but "1" gives 1.0 (100%).
pub fn parse_percent_entry(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let value = parse_decorated(trimmed)?;
    if trimmed.contains('%') || value.abs() > 1.0 {
        Some(value / 100.0)
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterOperator;

    fn sample() -> Card {
        let rows = vec![
            Row::from_iter([("Type", "Wall"), ("Area", "12 m2"), ("Rate", "10%")]),
            Row::from_iter([("Type", "Door"), ("Area", "3 m2"), ("Rate", "5%")]),
        ];
        Card::ingest("Muros", rows, &[], &NormalizerConfig::default())
            .unwrap()
            .0
    }

    #[test]
    fn ingest_normalizes_and_assigns_formats() {
        let card = sample();
        assert_eq!(card.column("Type").unwrap().format, ColumnFormat::Text);
        assert_eq!(card.column("Area").unwrap().format, ColumnFormat::Number);
        assert_eq!(card.rows[0].value("Area"), &CellValue::Number(12.0));
        assert_eq!(card.visible_columns, ["Type", "Area", "Rate"]);
        assert!(card.itemize);
        assert!(!card.id.is_empty());
    }

    #[test]
    fn ingest_respects_suggested_visible_columns() {
        let rows = vec![Row::from_iter([("Type", "Wall"), ("Area", "1")])];
        let suggested = vec!["Area".to_string(), "Ghost".to_string()];
        let (card, _) =
            Card::ingest("c", rows, &suggested, &NormalizerConfig::default()).unwrap();
        assert_eq!(card.visible_columns, ["Area"]);
    }

    #[test]
    fn ingest_rejects_invalid_config() {
        let config = NormalizerConfig {
            sample_size: 0,
            ..Default::default()
        };
        assert!(Card::ingest("c", Vec::new(), &[], &config).is_err());
    }

    #[test]
    fn formula_columns_are_added_and_updated() {
        let mut card = sample();
        card.set_formula("Cost", "[Area] * 10").unwrap();
        assert!(card.is_formula_column("Cost"));
        assert_eq!(card.visible_columns.last().map(String::as_str), Some("Cost"));

        card.set_formula("Cost", "[Area] * 20").unwrap();
        assert_eq!(card.formulas.len(), 1);
        assert_eq!(card.formulas[0].expression, "[Area] * 20");

        assert_eq!(
            card.set_formula("Area", "1"),
            Err(CardError::DuplicateColumn("Area".into()))
        );
        assert_eq!(card.set_formula(" ", "1"), Err(CardError::EmptyName));
    }

    #[test]
    fn removing_formula_clears_references() {
        let mut card = sample();
        card.set_formula("Cost", "[Area] * 10").unwrap();
        card.set_output_column("Cost", true).unwrap();
        card.set_sort(SortSpec::ascending("Cost")).unwrap();
        card.remove_formula("Cost").unwrap();
        assert!(!card.has_column("Cost"));
        assert!(card.output_columns.is_empty());
        assert!(card.sort.is_none());
        assert!(card.remove_formula("Area").is_err());
    }

    #[test]
    fn config_mutators_validate_columns() {
        let mut card = sample();
        assert!(card
            .add_filter(FilterPredicate::new("Ghost", FilterOperator::Equals, "x"))
            .is_err());
        assert!(card.set_sort(SortSpec::ascending("Ghost")).is_err());
        assert_eq!(
            card.set_visible_columns(vec!["Type".into(), "Type".into()]),
            Err(CardError::DuplicateColumn("Type".into()))
        );
        assert!(card.set_column_format("Ghost", ColumnFormat::Currency).is_err());
        card.set_column_format("Area", ColumnFormat::Currency).unwrap();
        assert_eq!(card.column("Area").unwrap().format, ColumnFormat::Currency);
    }

    #[test]
    fn output_column_toggle_is_idempotent() {
        let mut card = sample();
        card.set_output_column("Area", true).unwrap();
        card.set_output_column("Area", true).unwrap();
        assert_eq!(card.output_columns, ["Area"]);
        card.set_output_column("Area", false).unwrap();
        assert!(card.output_columns.is_empty());
    }

    #[test]
    fn edit_is_refused_while_grouped() {
        let mut card = sample();
        card.set_itemize(false);
        let before = card.rows.clone();
        assert_eq!(card.edit_cell(0, "Area", "99"), Err(EditError::GroupedView));
        assert_eq!(card.rows, before);
    }

    #[test]
    fn edit_validates_target() {
        let mut card = sample();
        card.set_formula("Cost", "[Area]").unwrap();
        assert_eq!(
            card.edit_cell(5, "Area", "1"),
            Err(EditError::RowOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(
            card.edit_cell(0, "Cost", "1"),
            Err(EditError::DerivedColumn("Cost".into()))
        );
        assert_eq!(
            card.edit_cell(0, "Ghost", "1"),
            Err(EditError::UnknownColumn("Ghost".into()))
        );
    }

    #[test]
    fn edit_parses_by_format() {
        let mut card = sample();
        assert_eq!(card.edit_cell(0, "Area", "15 m2"), Ok(CellValue::Number(15.0)));
        assert_eq!(card.edit_cell(0, "Area", "pending"), Ok(CellValue::text("pending")));
        assert_eq!(card.edit_cell(0, "Type", "42"), Ok(CellValue::text("42")));
        assert_eq!(card.edit_cell(0, "Area", ""), Ok(CellValue::Empty));
        card.set_column_format("Rate", ColumnFormat::Percent).unwrap();
        assert_eq!(card.edit_cell(1, "Rate", "50"), Ok(CellValue::Number(0.5)));
        assert_eq!(card.rows[1].value("Rate"), &CellValue::Number(0.5));
    }

    #[test]
    fn percent_entry_heuristic() {
        assert_eq!(parse_percent_entry("50%"), Some(0.5));
        assert_eq!(parse_percent_entry("50"), Some(0.5));
        assert_eq!(parse_percent_entry("0.5"), Some(0.5));
        assert_eq!(parse_percent_entry("1"), Some(1.0));
        assert_eq!(parse_percent_entry("1%"), Some(0.01));
        assert_eq!(parse_percent_entry(" 12.5 % "), Some(0.125));
        assert_eq!(parse_percent_entry("abc"), None);
    }

    #[test]
    fn serde_round_trip_keeps_card() {
        let mut card = sample();
        card.set_formula("Cost", "[Area] * 10").unwrap();
        card.set_itemize(false);
        let json = serde_json::to_string(&card).unwrap();
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }
}
