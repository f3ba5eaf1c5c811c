//! Error types for the sales_forecast crate

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the forecasting core.
///
/// Every stage fails fast with one of these; nothing is downgraded to a
/// default value.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The raw dataset is missing or cannot be read
    #[error("Source not found: {path}: {reason}")]
    SourceNotFound { path: PathBuf, reason: String },

    /// No rows matched the requested entity
    #[error("No rows found for entity '{entity_id}'")]
    EmptySelection { entity_id: String },

    /// An expected column is absent or holds missing values
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Not enough periods to hold out a test window
    #[error("Insufficient history: need at least {required} periods, found {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// Numerical fitting failure
    #[error("Model fit error: {0}")]
    ModelFitError(String),

    /// A plot or CSV artifact could not be persisted
    #[error("Failed to write artifact {path}: {source}")]
    ArtifactWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from configuration parsing
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from numeric kernels
    #[error("Math error: {0}")]
    MathError(#[from] forecast_math::MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl ForecastError {
    /// Wrap an IO failure on an output artifact
    pub fn artifact(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ForecastError::ArtifactWriteError {
            path: path.into(),
            source,
        }
    }
}
