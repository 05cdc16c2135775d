//! FILENAME: app/backend/src/api_types.rs
// PURPOSE: Shared type definitions handed to the rendering collaborator.
// CONTEXT: All structs use camelCase serialization for JavaScript interoperability.

use engine::{
    apply_filters, apply_formulas, output_rollups, run_pipeline_with_locale, Card, ColumnFormat,
    DisplayRow, FormatLocale, Rollup,
};
use serde::{Deserialize, Serialize};

/// Header of one visible column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnHeader {
    pub name: String,
    pub format: ColumnFormat,
    pub is_output: bool,
    /// True for formula columns (not editable).
    pub is_derived: bool,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRow {
    /// Source row to address edits to. None for grouped rows.
    pub source_index: Option<usize>,
    /// Key to pass to `drill_down_group`. Set only on grouped rows.
    pub group_key: Option<String>,
    pub cells: Vec<String>,
    pub count: usize,
}

impl From<DisplayRow> for ViewRow {
    fn from(row: DisplayRow) -> Self {
        ViewRow {
            source_index: row.source_index,
            group_key: row.group_key,
            cells: row.cells,
            count: row.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCell {
    pub column: String,
    /// Empty when the column has no total.
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupData {
    pub column: String,
    pub value: f64,
    pub display: String,
}

/// Everything needed to draw a card's table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub card_id: String,
    pub name: String,
    pub itemize: bool,
    pub grouped: bool,
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<ViewRow>,
    pub totals: Vec<TotalCell>,
    pub rollups: Vec<RollupData>,
}

/// The summary line of a card (its tile on the board).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    pub id: String,
    pub name: String,
    pub row_count: usize,
    pub rollups: Vec<RollupData>,
    pub modified_at: String,
}

fn rollup_data(card: &Card, rollups: Vec<Rollup>, locale: &FormatLocale) -> Vec<RollupData> {
    rollups
        .into_iter()
        .map(|r| {
            let format = card
                .column(&r.column)
                .map(|c| c.format)
                .unwrap_or_default();
            RollupData {
                display: engine::format_number(r.value, format, locale),
                column: r.column,
                value: r.value,
            }
        })
        .collect()
}

/// Runs the pipeline for `card` and shapes the result for rendering.
pub fn build_card_view(card: &Card, locale: &FormatLocale) -> CardView {
    let output = run_pipeline_with_locale(card, locale);

    let columns = output
        .columns
        .iter()
        .map(|c| ColumnHeader {
            name: c.name.clone(),
            format: c.format,
            is_output: card.is_output_column(&c.name),
            is_derived: card.is_formula_column(&c.name),
        })
        .collect();

    CardView {
        card_id: card.id.clone(),
        name: card.name.clone(),
        itemize: card.itemize,
        grouped: output.grouped,
        columns,
        rows: output.rows.into_iter().map(ViewRow::from).collect(),
        totals: output
            .totals
            .into_iter()
            .map(|t| TotalCell {
                column: t.column,
                display: t.display,
            })
            .collect(),
        rollups: rollup_data(card, output.rollups, locale),
    }
}

/// Builds the summary line. Rollups follow the filters only, so sorting and
/// grouping are skipped.
pub fn build_card_summary(card: &Card, locale: &FormatLocale) -> CardSummary {
    let computed = apply_formulas(&card.indexed_rows(), &card.formulas);
    let filtered = apply_filters(&computed, &card.filters);
    let rollups = output_rollups(&filtered, &card.output_columns);
    CardSummary {
        id: card.id.clone(),
        name: card.name.clone(),
        row_count: card.rows.len(),
        rollups: rollup_data(card, rollups, locale),
        modified_at: card.modified_at.clone(),
    }
}
