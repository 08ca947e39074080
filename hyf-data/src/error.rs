/// Error types for data loading
use hyf_core::HyError;
use hyf_utils::error::DateError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    /// Failed to open or read a file
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse CSV data
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to parse JSON data
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Forcing file without any columns
    #[error("forcing data has no time column")]
    MissingTimeColumn,

    /// A forcing row whose first column is not a timestamp
    #[error("row {row}: bad timestamp {value:?}")]
    Timestamp { row: usize, value: String },

    /// A forcing cell that is not numeric
    #[error("row {row}: {column} is not numeric: {value:?}")]
    Value {
        row: usize,
        column: String,
        value: String,
    },

    /// Catchment params carry no `forcing.path`
    #[error("catchment {0} has no forcing path")]
    MissingForcingPath(String),

    /// Bad date in configuration
    #[error(transparent)]
    Date(#[from] DateError),

    /// Network or formulation error
    #[error(transparent)]
    Core(#[from] HyError),
}

/// Type alias for Results using DataError
pub type Result<T> = std::result::Result<T, DataError>;
