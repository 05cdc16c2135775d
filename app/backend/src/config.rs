//! FILENAME: app/backend/src/config.rs
// PURPOSE: Application configuration loaded from a JSON file.
// CONTEXT: Every field has a default, so a partial or missing file is valid.

use std::path::{Path, PathBuf};

use engine::{FormatLocale, NormalizerConfig};
use serde::{Deserialize, Serialize};

use crate::error::CommandError;

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub locale: FormatLocale,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            normalizer: NormalizerConfig::default(),
            locale: FormatLocale::default(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, CommandError> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let json = std::fs::read_to_string(path)
            .map_err(|e| CommandError::ConfigFile(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, CommandError> {
        let config: AppConfig =
            serde_json::from_str(json).map_err(|e| CommandError::ConfigFile(e.to_string()))?;
        config.normalizer.validate()?;
        Ok(config)
    }
}
