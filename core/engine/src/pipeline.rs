//! FILENAME: core/engine/src/pipeline.rs
//! PURPOSE: Runs a card through Formula -> Filter -> Sort -> Group -> Format/Summary.
//! CONTEXT: A pure function of the card. It never mutates the card's rows and
//! identical cards give identical output. The normalizer is not part of this
//! run; it happened once when the card was ingested.

use log::debug;
use serde::Serialize;

use crate::card::Card;
use crate::column::Column;
use crate::config::FormatLocale;
use crate::filter::apply_filters;
use crate::format::format_value;
use crate::formula::apply_formulas;
use crate::group::{group_rows, GroupDefinition};
use crate::row::Row;
use crate::sort::apply_sort;
use crate::summary::{column_totals, output_rollups, ColumnTotal, Rollup};

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    /// Position in the card's source rows; None for aggregate rows.
    pub source_index: Option<usize>,
    /// Identity of an aggregate row's group, as accepted by `drill_down`.
    pub group_key: Option<String>,
    pub values: Row,
    /// Display strings, one per visible column.
    pub cells: Vec<String>,
    /// Source rows behind this row (1 when itemized).
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub columns: Vec<Column>,
    pub rows: Vec<DisplayRow>,
    pub totals: Vec<ColumnTotal>,
    pub rollups: Vec<Rollup>,
    pub grouped: bool,
}

impl PipelineOutput {
    pub fn total(&self, column: &str) -> Option<f64> {
        self.totals
            .iter()
            .find(|t| t.column == column)
            .and_then(|t| t.total)
    }

    pub fn rollup(&self, column: &str) -> Option<f64> {
        self.rollups
            .iter()
            .find(|r| r.column == column)
            .map(|r| r.value)
    }
}

pub fn run_pipeline(card: &Card) -> PipelineOutput {
    run_pipeline_with_locale(card, &FormatLocale::default())
}

pub fn run_pipeline_with_locale(card: &Card, locale: &FormatLocale) -> PipelineOutput {
    let computed = apply_formulas(&card.indexed_rows(), &card.formulas);
    let filtered = apply_filters(&computed, &card.filters);
    let sorted = apply_sort(&filtered, card.sort.as_ref());

    let columns = card.display_columns();
    let render = |values: &Row| -> Vec<String> {
        columns
            .iter()
            .map(|c| format_value(values.value(&c.name), c.format, locale))
            .collect()
    };

    let grouped = card.is_grouped();
    let rows: Vec<DisplayRow> = match card.sort.as_ref().filter(|_| grouped) {
        Some(sort) => {
            let definition = GroupDefinition::new(sort.field.clone(), card.visible_columns.clone());
            group_rows(&sorted, &definition)
                .into_iter()
                .map(|g| DisplayRow {
                    source_index: None,
                    cells: render(&g.row),
                    group_key: Some(g.key),
                    values: g.row,
                    count: g.count,
                })
                .collect()
        }
        None => sorted
            .into_iter()
            .map(|r| DisplayRow {
                source_index: Some(r.source_index),
                group_key: None,
                cells: render(&r.row),
                values: r.row,
                count: 1,
            })
            .collect(),
    };

    let final_values: Vec<Row> = rows.iter().map(|r| r.values.clone()).collect();
    let totals = column_totals(&final_values, &columns, locale);
    let rollups = output_rollups(&filtered, &card.output_columns);

    debug!(
        target: "PIPELINE",
        "card '{}': {} rows -> {} filtered -> {} displayed (grouped: {})",
        card.name,
        card.rows.len(),
        filtered.len(),
        rows.len(),
        grouped
    );

    PipelineOutput {
        columns,
        rows,
        totals,
        rollups,
        grouped,
    }
}
