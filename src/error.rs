//! Error taxonomy for the cleaning stage.
//!
//! Nothing here is recovered locally: every variant propagates up to
//! [`crate::pipeline::run`] and aborts the run before output is written.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file absent, unreadable, or an archive without a CSV entry.
    #[error("input {path:?} is missing or unreadable: {source}")]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required column is absent or the table shape is not what we expect.
    #[error("schema error: {0}")]
    Schema(String),

    /// A cell could not be parsed into its column type.
    #[error("cannot parse {column} at row {row}: {value:?}")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },

    #[error("invalid config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn missing_input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::MissingInput {
            path: path.into(),
            source,
        }
    }

    pub fn parse(column: &str, row: usize, value: impl Into<String>) -> Self {
        PipelineError::Parse {
            column: column.to_string(),
            row,
            value: value.into(),
        }
    }
}
