use std::fs::File;
use std::path::PathBuf;

use polars::prelude::*;
use tracing::debug;

use crate::config::{SourceConfig, TableFormat};
use crate::error::CensusError;

/// Somewhere a raw sightings table can be fetched from.
pub trait TableSource {
    /// Fetch the raw table. Column names and values are not normalized yet.
    fn fetch(&self) -> Result<DataFrame, CensusError>;

    /// Human-readable description used in log lines.
    fn describe(&self) -> String;
}

/// Exported table on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: TableFormat,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, format: TableFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(config.table_path(), config.format)
    }
}

impl TableSource for FileSource {
    fn fetch(&self) -> Result<DataFrame, CensusError> {
        debug!(path = %self.path.display(), format = ?self.format, "Reading sightings table");
        let df = match self.format {
            // All columns as String; typing happens once at the load boundary.
            TableFormat::Csv => CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(Some(0))
                .try_into_reader_with_file_path(Some(self.path.clone()))?
                .finish()?,
            TableFormat::Parquet => {
                let file = File::open(&self.path)?;
                ParquetReader::new(file).finish()?
            }
        };
        Ok(df)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.path.display(), self.format.extension())
    }
}

/// In-memory table, used by tests and the Python bindings.
#[derive(Debug, Clone)]
pub struct FrameSource {
    frame: DataFrame,
}

impl FrameSource {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }
}

impl TableSource for FrameSource {
    fn fetch(&self) -> Result<DataFrame, CensusError> {
        Ok(self.frame.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory frame ({} rows)", self.frame.height())
    }
}
