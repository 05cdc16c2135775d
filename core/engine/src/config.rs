//! FILENAME: core/engine/src/config.rs
//! PURPOSE: Tunable settings for ingestion and display.
//! CONTEXT: Type inference is heuristic, so its sample size, acceptance
//! threshold and unit-suffix pattern are data rather than code. All fields
//! default, so a partial JSON config is valid.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Unit suffixes accepted on numeric-looking text, with optional area/volume power.
pub const DEFAULT_UNIT_PATTERN: &str = r"^(m|ft|in|mm|cm|kg|lb|%|°|deg|yd)(2|3|²|³)?\.?$";

/// Settings for the Column Normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizerConfig {
    /// How many leading rows are sampled per column.
    pub sample_size: usize,
    /// Share of numeric samples a column must exceed to be converted.
    pub threshold: f64,
    /// Case-insensitive pattern the unit suffix of a decorated value must match.
    pub unit_pattern: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfig {
            sample_size: 20,
            threshold: 0.8,
            unit_pattern: DEFAULT_UNIT_PATTERN.to_string(),
        }
    }
}

impl NormalizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_size == 0 {
            return Err(ConfigError::InvalidSampleSize);
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        self.compile_unit_pattern()?;
        Ok(())
    }

    pub fn compile_unit_pattern(&self) -> Result<Regex, ConfigError> {
        Ok(RegexBuilder::new(&self.unit_pattern)
            .case_insensitive(true)
            .build()?)
    }
}

/// Locale conventions for currency display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatLocale {
    pub currency_symbol: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
    /// Place the symbol after the amount ("1.234,50 €").
    pub symbol_after: bool,
}

impl Default for FormatLocale {
    fn default() -> Self {
        FormatLocale {
            currency_symbol: "$".to_string(),
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            symbol_after: false,
        }
    }
}
