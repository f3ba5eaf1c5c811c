//! # Forecast Math
//!
//! Numeric building blocks for regression-with-seasonality forecasting.
//! This crate provides descriptive statistics, Fourier seasonality features,
//! column standardization, accuracy metrics and a ridge least squares solver.

use thiserror::Error;

pub mod features;
pub mod linalg;
pub mod stats;

pub use features::{fourier_series, Standardizer};
pub use linalg::{cholesky_solve, ridge_regression};
pub use stats::{mean, mean_absolute_percentage_error, median, std_dev};

/// Errors that can occur in forecasting math
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;
