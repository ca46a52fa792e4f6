//! Connection configuration for the sightings table.
//!
//! The configuration is a small JSON document, e.g.
//!
//! ```json
//! {
//!     "table": "squirrels_engineered_features",
//!     "data_dir": "../data",
//!     "format": "csv",
//!     "bounds": { "min_lat": 40.76, "max_lat": 40.81, "min_lon": -73.99, "max_lon": -73.94 }
//! }
//! ```
//!
//! A relative `data_dir` is resolved against the directory holding the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CensusError;

pub const DEFAULT_TABLE: &str = "squirrels_engineered_features";
pub const DEFAULT_CONFIG_PATH: &str = "include/state.json";
pub const CONFIG_ENV_VAR: &str = "SQUIRREL_CENSUS_CONFIG";

/// On-disk format of the exported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Csv,
    Parquet,
}

impl TableFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
        }
    }
}

/// Bounding box every sighting coordinate must fall within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn contains_lat(&self, lat: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat)
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon)
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.contains_lat(lat) && self.contains_lon(lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub format: TableFormat,
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            data_dir: default_data_dir(),
            format: TableFormat::default(),
            bounds: None,
        }
    }
}

impl SourceConfig {
    /// Read the configuration file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, CensusError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CensusError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config: SourceConfig = serde_json::from_str(&text)?;

        if config.table.trim().is_empty() {
            return Err(CensusError::Config("table name must not be empty".into()));
        }
        if let Some(bounds) = config.bounds {
            if bounds.min_lat > bounds.max_lat || bounds.min_lon > bounds.max_lon {
                return Err(CensusError::Config(format!(
                    "bounds are inverted: {bounds:?}"
                )));
            }
        }

        if config.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.data_dir = parent.join(&config.data_dir);
            }
        }
        debug!(path = %path.display(), table = %config.table, "Loaded source config");
        Ok(config)
    }

    /// Path of the exported table file.
    pub fn table_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", self.table, self.format.extension()))
    }
}

/// Resolve the config path: explicit argument first, then the
/// `SQUIRREL_CENSUS_CONFIG` environment variable, then the default.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}
