#[cfg(feature = "python")]
use pyo3::exceptions::PyRuntimeError;
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CensusError {
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("InvalidData: column '{column}' row {row}: {message}")]
    InvalidData {
        column: String,
        row: usize,
        message: String,
    },

    #[error("Unknown shift label: '{0}' (expected AM or PM)")]
    UnknownShift(String),

    #[error("Cannot compute a midpoint of an empty {0} sequence")]
    EmptyCoordinates(&'static str),

    #[error("Config: {0}")]
    Config(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CensusError {
    pub(crate) fn invalid(column: &str, row: usize, message: impl Into<String>) -> Self {
        CensusError::InvalidData {
            column: column.to_string(),
            row,
            message: message.into(),
        }
    }
}

#[cfg(feature = "python")]
impl From<CensusError> for PyErr {
    fn from(err: CensusError) -> PyErr {
        PyRuntimeError::new_err(err.to_string())
    }
}
