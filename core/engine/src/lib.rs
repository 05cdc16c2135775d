//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the quantity takeoff engine.
//! CONTEXT: Re-exports public types and modules for use by other crates.
//! Stages run in a fixed order on every recompute:
//! Normalizer (once, at ingest) -> Formula -> Filter -> Sort -> Group -> Format/Summary.

pub mod card;
pub mod cell;
pub mod column;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod formula;
pub mod group;
pub mod normalize;
pub mod numeric;
pub mod pipeline;
pub mod row;
pub mod sort;
pub mod summary;

// Re-export commonly used types at the crate root
pub use card::{parse_percent_entry, Card};
pub use cell::CellValue;
pub use column::{Column, ColumnFormat};
pub use config::{FormatLocale, NormalizerConfig, DEFAULT_UNIT_PATTERN};
pub use error::{CardError, ConfigError, EditError};
pub use filter::{apply_filters, FilterOperator, FilterPredicate};
pub use format::{format_number, format_value};
pub use formula::{apply_formulas, compile_formulas, CompiledFormula, FormulaColumn, FormulaSpec};
pub use group::{
    drill_down, group_key, group_rows, GroupDefinition, GroupRow, EMPTY_GROUP_LABEL, VARIES_LABEL,
};
pub use normalize::{
    normalize_rows, ColumnClassification, ColumnClassifier, NormalizationReport,
    SampledClassifier,
};
pub use pipeline::{run_pipeline, run_pipeline_with_locale, DisplayRow, PipelineOutput};
pub use row::{discover_columns, IndexedRow, Row};
pub use sort::{apply_sort, compare_values, SortSpec};
pub use summary::{column_totals, output_rollups, ColumnTotal, Rollup};
