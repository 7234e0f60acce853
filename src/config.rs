//! Defaults for a sweep, read from an optional TOML file.
//!
//! ```toml
//! preview_rows = 10
//! columns = ["name", "score"]
//! export = "xlsx"
//! output_dir = "cleaned"
//!
//! [cleaning]
//! remove_duplicates = true
//! fill_missing_with_mean = true
//!
//! [input]
//! encoding = "windows-1252"
//! null_values = ["", "NA", "-"]
//! ```

use crate::error::SweeperError;
use crate::pipeline::batch::FileRequest;
use crate::pipeline::CleaningOptions;
use crate::pipeline::ColumnSelection;
use crate::spreadsheet::FileFormat;
use crate::spreadsheet::LoadOptions;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// How delimited input is decoded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Encoding label, e.g. `utf-8` or `latin1`
    pub encoding: Option<String>,
    /// Windows code page; takes precedence over `encoding`
    pub codepage: Option<u16>,
    /// Replaces the default set of missing-value literals
    pub null_values: Option<Vec<String>>,
}

/// Sweep defaults; command-line flags override individual fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Columns to keep, in order; empty keeps all
    pub columns: Vec<String>,
    /// Export tag: `csv`, `xlsx` or `excel`
    pub export: Option<String>,
    pub preview_rows: usize,
    pub chart: bool,
    pub output_dir: Option<PathBuf>,
    pub cleaning: CleaningOptions,
    pub input: InputConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            export: None,
            preview_rows: 5,
            chart: false,
            output_dir: None,
            cleaning: CleaningOptions::default(),
            input: InputConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Reads a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Decoding options for delimited input.
    pub fn load_options(&self) -> Result<LoadOptions, SweeperError> {
        let mut options = LoadOptions::default();
        if let Some(null_values) = &self.input.null_values {
            options.null_values = null_values.iter().cloned().collect();
        }
        if let Some(label) = &self.input.encoding {
            options = options.with_encoding_label(label)?;
        }
        if let Some(codepage) = self.input.codepage {
            options = options.with_codepage(codepage)?;
        }
        Ok(options)
    }

    /// The per-file request these settings describe.
    pub fn file_request(&self) -> Result<FileRequest, SweeperError> {
        let selection = if self.columns.is_empty() {
            ColumnSelection::All
        } else {
            ColumnSelection::Columns(self.columns.clone())
        };
        let export = self.export.as_deref().map(str::parse::<FileFormat>).transpose()?;
        Ok(FileRequest {
            cleaning: self.cleaning,
            selection,
            export,
            preview_rows: self.preview_rows,
            chart: self.chart,
        })
    }
}
