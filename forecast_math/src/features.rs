//! Feature construction for regression forecasting
//!
//! Contains:
//! - Fourier series terms for smooth periodic seasonality
//! - Column standardization for exogenous regressors

use crate::{stats, MathError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Standard deviations below this are treated as a constant column
const CONSTANT_COLUMN_TOLERANCE: f64 = 1e-12;

/// Build Fourier terms for each time point.
///
/// `t_days` are offsets in days from a fixed origin. Each returned row holds
/// `2 * order` values laid out as `[sin(1), cos(1), sin(2), cos(2), ...]`.
pub fn fourier_series(t_days: &[f64], period: f64, order: usize) -> Result<Vec<Vec<f64>>> {
    if period <= 0.0 {
        return Err(MathError::InvalidInput(
            "Seasonality period must be positive".to_string(),
        ));
    }

    let rows = t_days
        .iter()
        .map(|&t| {
            let mut row = Vec::with_capacity(2 * order);
            for k in 1..=order {
                let angle = 2.0 * PI * k as f64 * t / period;
                row.push(angle.sin());
                row.push(angle.cos());
            }
            row
        })
        .collect();

    Ok(rows)
}

/// Mean/std scaling learned from one column and replayed on new values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    mean: f64,
    std: f64,
}

impl Standardizer {
    /// Learn the scaling of a column
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Column contains NaN or infinite values".to_string(),
            ));
        }

        Ok(Self {
            mean: stats::mean(values)?,
            std: stats::std_dev(values)?,
        })
    }

    /// Column mean seen during fitting
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Column standard deviation seen during fitting
    pub fn std(&self) -> f64 {
        self.std
    }

    /// Whether the fitted column carried no variance
    pub fn is_constant(&self) -> bool {
        self.std < CONSTANT_COLUMN_TOLERANCE
    }

    /// Scale a single value. Constant columns map to zero.
    pub fn transform(&self, value: f64) -> f64 {
        if self.is_constant() {
            0.0
        } else {
            (value - self.mean) / self.std
        }
    }

    /// Convert a coefficient on the standardized column back to raw units
    pub fn unscale_coefficient(&self, coefficient: f64) -> f64 {
        if self.is_constant() {
            0.0
        } else {
            coefficient / self.std
        }
    }
}
