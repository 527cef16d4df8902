//! Error types for Nocturne

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading data or computing sleep metrics
#[derive(Debug, Error)]
pub enum NocturneError {
    #[error("The file {0} does not exist")]
    FileNotFound(PathBuf),

    #[error("Unsupported file format: {0}. Supported formats are .csv and .tsv")]
    UnsupportedFormat(String),

    #[error("Missing required columns in the data: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Failed to parse value in column '{column}': {value}")]
    ParseError { column: String, value: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid night window: {0}")]
    InvalidNightWindow(String),

    #[error("Non-wear threshold must be within [0.0, 1.0], got {0}")]
    InvalidThreshold(f64),

    #[error("No valid nights found in the data")]
    NoValidNights,

    #[error("Cannot compute circular statistics of an empty time series")]
    EmptyTimeSeries,

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
