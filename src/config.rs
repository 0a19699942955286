//! Workflow Configuration
//! Fixed parameters of the analysis run, optionally loaded from JSON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Parameters of one workflow run. Missing JSON fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Raw dataset.
    pub input: PathBuf,
    /// Identifier column moved to the front of every loaded table.
    pub index_column: String,
    /// Sentinel replacing null cells.
    pub null_fill: String,
    /// Where the cleaned table is exported.
    pub cleaned_export: PathBuf,
    pub graphs_dir: PathBuf,
    pub csv_dir: PathBuf,
    /// First year kept by the trend steps.
    pub min_year: i64,
    /// Categories shown per distribution chart.
    pub top_n: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("netflix_titles.csv"),
            index_column: "show_id".to_string(),
            null_fill: "No item specified".to_string(),
            cleaned_export: PathBuf::from("netflix_titles_cleaned.csv"),
            graphs_dir: PathBuf::from("graphs"),
            csv_dir: PathBuf::from("csv_files"),
            min_year: 2010,
            top_n: 8,
        }
    }
}

impl WorkflowConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index_column.is_empty() {
            return Err(ConfigError::Invalid("index_column is empty".to_string()));
        }
        if self.top_n == 0 {
            return Err(ConfigError::Invalid("top_n must be at least 1".to_string()));
        }
        Ok(())
    }
}
