//! Forecasting model interface and prediction results

use crate::data::CleanedSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDateTime;
use std::fmt::Debug;

pub mod seasonal_regression;

pub use seasonal_regression::{FittedSeasonalRegression, SeasonalRegression};

/// Timestamps plus the regressor values a model predicts from
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFrame {
    /// Regressor names, in column order
    regressor_names: Vec<String>,
    /// Prediction timestamps
    timestamps: Vec<NaiveDateTime>,
    /// One row of regressor values per timestamp
    regressors: Vec<Vec<f64>>,
}

impl ModelFrame {
    /// Create a frame, checking that every row matches the regressor names
    pub fn new(
        regressor_names: Vec<String>,
        timestamps: Vec<NaiveDateTime>,
        regressors: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if timestamps.len() != regressors.len() {
            return Err(ForecastError::SchemaMismatch(format!(
                "{} timestamps but {} regressor rows",
                timestamps.len(),
                regressors.len()
            )));
        }
        if let Some(row) = regressors.iter().find(|r| r.len() != regressor_names.len()) {
            return Err(ForecastError::SchemaMismatch(format!(
                "regressor row has {} values, expected {}",
                row.len(),
                regressor_names.len()
            )));
        }

        Ok(Self::new_unchecked(regressor_names, timestamps, regressors))
    }

    pub(crate) fn new_unchecked(
        regressor_names: Vec<String>,
        timestamps: Vec<NaiveDateTime>,
        regressors: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            regressor_names,
            timestamps,
            regressors,
        }
    }

    /// Regressor names
    pub fn regressor_names(&self) -> &[String] {
        &self.regressor_names
    }

    /// Prediction timestamps
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Regressor rows
    pub fn regressors(&self) -> &[Vec<f64>] {
        &self.regressors
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the frame is empty
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Append another frame with the same regressor names
    pub fn concat(mut self, other: ModelFrame) -> Result<Self> {
        if self.regressor_names != other.regressor_names {
            return Err(ForecastError::SchemaMismatch(
                "cannot join frames with different regressors".to_string(),
            ));
        }
        self.timestamps.extend(other.timestamps);
        self.regressors.extend(other.regressors);
        Ok(self)
    }
}

/// Point predictions for a set of timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Prediction timestamps
    timestamps: Vec<NaiveDateTime>,
    /// Predicted values
    values: Vec<f64>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(ForecastError::DataError(format!(
                "Values length ({}) doesn't match timestamps length ({})",
                values.len(),
                timestamps.len()
            )));
        }

        Ok(Self { timestamps, values })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the timestamps
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Number of predictions
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no predictions
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The last `n` predictions
    pub fn tail(&self, n: usize) -> Self {
        let start = self.values.len().saturating_sub(n);
        Self {
            timestamps: self.timestamps[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }

    /// Sum of the predictions
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Mean of the predictions
    pub fn average(&self) -> Result<f64> {
        Ok(forecast_math::mean(&self.values)?)
    }

    /// Calculate mean absolute percentage error against actual values
    pub fn mean_absolute_percentage_error(&self, actual: &[f64]) -> Result<f64> {
        Ok(forecast_math::mean_absolute_percentage_error(
            actual,
            &self.values,
        )?)
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Predict values for the timestamps and regressors of `frame`
    fn predict(&self, frame: &ModelFrame) -> Result<ForecastResult>;

    /// Regressor names in coefficient order
    fn regressor_names(&self) -> &[String];

    /// Per-regressor coefficient estimates, one inner vector per draw
    fn regressor_coefficient_draws(&self) -> &[Vec<f64>];

    /// Number of observations the model was fitted on
    fn training_len(&self) -> usize;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a cleaned series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model, using every regressor of the series as an exogenous input
    fn train(&self, series: &CleanedSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}
