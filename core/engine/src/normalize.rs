//! FILENAME: core/engine/src/normalize.rs
//! PURPOSE: Column Normalizer. Detects columns that are numeric but arrive as
//! decorated strings ("120 m2", "$45.00", "12%") and rewrites them to numbers.
//! CONTEXT: Runs once at ingest, never during interactive editing. Inference is a
//! pluggable strategy (`ColumnClassifier`) so sampling and unit rules can be
//! tuned and tested apart from the rest of the pipeline.

use log::debug;
use regex::Regex;

use crate::cell::CellValue;
use crate::config::NormalizerConfig;
use crate::error::ConfigError;
use crate::numeric::parse_decorated;
use crate::row::{discover_columns, Row};

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Outcome of sampling one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnClassification {
    /// Non-empty sampled cells.
    pub valid_count: usize,
    /// Sampled cells accepted as numeric candidates.
    pub numeric_count: usize,
    pub is_numeric: bool,
}

/// Strategy deciding whether a column should be converted to numbers.
pub trait ColumnClassifier {
    fn classify(&self, column: &str, rows: &[Row]) -> ColumnClassification;
}

/// Default strategy: sample the first rows of a column and convert when the
/// share of numeric-looking cells exceeds a threshold.
#[derive(Debug, Clone)]
pub struct SampledClassifier {
    sample_size: usize,
    threshold: f64,
    unit_pattern: Regex,
}

impl SampledClassifier {
    pub fn new(config: &NormalizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(SampledClassifier {
            sample_size: config.sample_size,
            threshold: config.threshold,
            unit_pattern: config.compile_unit_pattern()?,
        })
    }

    /// Whether a single sampled cell counts as a numeric candidate.
    pub fn is_numeric_candidate(&self, value: &CellValue) -> bool {
        match value {
            CellValue::Number(n) => n.is_finite(),
            CellValue::Empty => false,
            CellValue::Text(s) => {
                if parse_decorated(s).is_none() {
                    return false;
                }
                if !s.chars().any(char::is_alphabetic) {
                    return true;
                }
                self.unit_pattern.is_match(unit_suffix(s))
            }
        }
    }
}

impl ColumnClassifier for SampledClassifier {
    fn classify(&self, column: &str, rows: &[Row]) -> ColumnClassification {
        let mut result = ColumnClassification::default();

        for row in rows.iter().take(self.sample_size) {
            let value = row.value(column);
            if value.is_empty() {
                continue;
            }
            result.valid_count += 1;
            if self.is_numeric_candidate(value) {
                result.numeric_count += 1;
            }
        }

        result.is_numeric = result.valid_count > 0
            && (result.numeric_count as f64 / result.valid_count as f64) > self.threshold;
        result
    }
}

/// The text left after the leading numeric body: "120 m2" -> "m2", "$45 USD" -> "USD".
fn unit_suffix(s: &str) -> &str {
    s.trim_start_matches(|c: char| {
        c.is_ascii_digit()
            || c.is_whitespace()
            || matches!(c, '.' | ',' | '-' | '+' | '$' | '€' | '£')
    })
    .trim()
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Which columns the normalizer converted and which it left as text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizationReport {
    pub converted: Vec<String>,
    pub kept: Vec<String>,
}

impl NormalizationReport {
    pub fn was_converted(&self, column: &str) -> bool {
        self.converted.iter().any(|c| c == column)
    }
}

/// Rewrites every column the classifier accepts to plain numbers, in place.
/// Cells that fail to parse are left unchanged.
pub fn normalize_rows<C: ColumnClassifier + ?Sized>(
    rows: &mut [Row],
    classifier: &C,
) -> NormalizationReport {
    let mut report = NormalizationReport::default();

    for column in discover_columns(rows) {
        let classification = classifier.classify(&column, rows);
        debug!(
            target: "NORMALIZE",
            "column '{}': {}/{} numeric samples -> {}",
            column,
            classification.numeric_count,
            classification.valid_count,
            if classification.is_numeric { "convert" } else { "keep" }
        );

        if !classification.is_numeric {
            report.kept.push(column);
            continue;
        }

        for row in rows.iter_mut() {
            if let Some(cell) = row.get_mut(&column) {
                convert_cell(cell);
            }
        }
        report.converted.push(column);
    }

    report
}

fn convert_cell(cell: &mut CellValue) {
    if let CellValue::Text(s) = cell {
        if let Some(n) = parse_decorated(s) {
            *cell = CellValue::Number(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SampledClassifier {
        SampledClassifier::new(&NormalizerConfig::default()).unwrap()
    }

    fn column_rows(values: &[&str]) -> Vec<Row> {
        values
            .iter()
            .map(|v| Row::from_iter([("Area", *v)]))
            .collect()
    }

    #[test]
    fn candidate_rules() {
        let c = classifier();
        assert!(c.is_numeric_candidate(&CellValue::Number(3.0)));
        assert!(c.is_numeric_candidate(&"120 m2".into()));
        assert!(c.is_numeric_candidate(&"$45.00".into()));
        assert!(c.is_numeric_candidate(&"12%".into()));
        assert!(c.is_numeric_candidate(&"3,5 KG".into()));
        assert!(c.is_numeric_candidate(&"90°".into()));
        assert!(!c.is_numeric_candidate(&"Nivel 3".into()));
        assert!(!c.is_numeric_candidate(&"Muro".into()));
        assert!(!c.is_numeric_candidate(&"12 units".into()));
        assert!(!c.is_numeric_candidate(&CellValue::Empty));
    }

    #[test]
    fn unit_suffix_skips_numeric_body() {
        assert_eq!(unit_suffix("120 m2"), "m2");
        assert_eq!(unit_suffix("$1,250.00 USD"), "USD");
        assert_eq!(unit_suffix("-3.5kg"), "kg");
    }

    #[test]
    fn converts_decorated_column() {
        let mut rows = column_rows(&["12 m2", "8 m2", "3 m2"]);
        let report = normalize_rows(&mut rows, &classifier());
        assert_eq!(report.converted, vec!["Area".to_string()]);
        assert_eq!(rows[0].value("Area"), &CellValue::Number(12.0));
        assert_eq!(rows[2].value("Area"), &CellValue::Number(3.0));
    }

    #[test]
    fn leaves_text_column_alone() {
        let mut rows = column_rows(&["Muro", "Puerta", "Nivel 2"]);
        let report = normalize_rows(&mut rows, &classifier());
        assert_eq!(report.kept, vec!["Area".to_string()]);
        assert_eq!(rows[2].value("Area"), &CellValue::text("Nivel 2"));
    }

    #[test]
    fn column_without_samples_is_kept() {
        let mut rows = column_rows(&["", "  ", ""]);
        let report = normalize_rows(&mut rows, &classifier());
        assert!(report.converted.is_empty());
        assert_eq!(report.kept, vec!["Area".to_string()]);
    }

    #[test]
    fn empty_cells_do_not_count_as_samples() {
        let c = classifier();
        let rows = column_rows(&["5 m", "", "7 m", ""]);
        let classification = c.classify("Area", &rows);
        assert_eq!(classification.valid_count, 2);
        assert_eq!(classification.numeric_count, 2);
        assert!(classification.is_numeric);
    }

    #[test]
    fn conversion_reaches_past_the_sample() {
        let mut values = vec!["1 m"; 20];
        values.push("99 m");
        let mut rows = column_rows(&values);
        normalize_rows(&mut rows, &classifier());
        assert_eq!(rows[20].value("Area"), &CellValue::Number(99.0));
    }

    #[test]
    fn unparseable_cells_in_converted_column_stay_text() {
        let mut values = vec!["4 m"; 19];
        values.push("n/a");
        let mut rows = column_rows(&values);
        normalize_rows(&mut rows, &classifier());
        assert_eq!(rows[19].value("Area"), &CellValue::text("n/a"));
        assert_eq!(rows[0].value("Area"), &CellValue::Number(4.0));
    }

    #[test]
    fn second_pass_changes_nothing() {
        let mut rows = column_rows(&["12 m2", "8 m2", "x"]);
        rows.push(Row::from_iter([("Area", "4 m2")]));
        rows.push(Row::from_iter([("Area", "5 m2")]));
        rows.push(Row::from_iter([("Area", "6 m2")]));
        let first = normalize_rows(&mut rows, &classifier());
        assert!(first.was_converted("Area"));
        let once = rows.clone();
        normalize_rows(&mut rows, &classifier());
        assert_eq!(rows, once);
    }

    #[test]
    fn custom_threshold() {
        let config = NormalizerConfig {
            threshold: 0.5,
            ..Default::default()
        };
        let c = SampledClassifier::new(&config).unwrap();
        let rows = column_rows(&["1 m", "2 m", "x", "y"]);
        assert!(!c.classify("Area", &rows).is_numeric);
        let rows = column_rows(&["1 m", "2 m", "3 m", "y"]);
        assert!(c.classify("Area", &rows).is_numeric);
    }
}
