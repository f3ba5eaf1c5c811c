//! Linear trend plus yearly Fourier seasonality plus exogenous regressors
//!
//! The fitted curve is
//!
//! ```text
//! y(t) = y_scale * (b0 + b1 * t_scaled + sum(fourier_k(t) * s_k) + sum(z_j(t) * g_j))
//! ```
//!
//! where `t_scaled` maps the fit window onto `[0, 1]`, `z_j` are regressors
//! standardized with the fit window's mean and standard deviation, and
//! `y_scale` is the largest absolute target. Coefficients solve a ridge
//! problem in which only the seasonal and regressor terms are penalized, so a
//! series that is exactly linear is reproduced exactly.

use crate::data::CleanedSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, ModelFrame, TrainedForecastModel};
use chrono::NaiveDateTime;
use forecast_math::{fourier_series, ridge_regression, Standardizer};
use serde::{Deserialize, Serialize};

const MODEL_NAME: &str = "Seasonal Regression";
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Model specification. Cheap to clone; each `train` call yields an independent fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalRegression {
    /// Number of sine/cosine pairs in the yearly block
    pub yearly_order: usize,
    /// Length of the seasonal cycle in days
    pub yearly_period_days: f64,
    /// L2 penalty on seasonal and regressor coefficients
    pub ridge_penalty: f64,
}

impl Default for SeasonalRegression {
    fn default() -> Self {
        Self {
            yearly_order: 10,
            yearly_period_days: 365.25,
            ridge_penalty: 0.1,
        }
    }
}

impl SeasonalRegression {
    /// Create a model with the default yearly seasonality
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Fourier order of the yearly block; zero disables seasonality
    pub fn with_yearly_order(mut self, order: usize) -> Self {
        self.yearly_order = order;
        self
    }

    /// Set the ridge penalty
    pub fn with_ridge_penalty(mut self, penalty: f64) -> Self {
        self.ridge_penalty = penalty;
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.yearly_period_days.is_finite() && self.yearly_period_days > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Seasonal period must be a positive number of days".to_string(),
            ));
        }
        if !(self.ridge_penalty.is_finite() && self.ridge_penalty >= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Ridge penalty must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Feature construction shared by fitting and prediction
#[derive(Debug, Clone, PartialEq)]
struct Basis {
    t0: NaiveDateTime,
    span_seconds: f64,
    yearly_order: usize,
    yearly_period_days: f64,
    standardizers: Vec<Standardizer>,
}

impl Basis {
    fn width(&self) -> usize {
        2 + 2 * self.yearly_order + self.standardizers.len()
    }

    fn design(&self, timestamps: &[NaiveDateTime], regressors: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let offsets: Vec<f64> = timestamps
            .iter()
            .map(|ts| (*ts - self.t0).num_seconds() as f64)
            .collect();
        let t_days: Vec<f64> = offsets.iter().map(|s| s / SECONDS_PER_DAY).collect();
        let seasonal = fourier_series(&t_days, self.yearly_period_days, self.yearly_order)?;

        let rows = offsets
            .iter()
            .zip(seasonal)
            .zip(regressors.iter())
            .map(|((offset, fourier), values)| {
                let mut row = Vec::with_capacity(self.width());
                row.push(1.0);
                row.push(offset / self.span_seconds);
                row.extend(fourier);
                row.extend(
                    self.standardizers
                        .iter()
                        .zip(values.iter())
                        .map(|(s, &v)| s.transform(v)),
                );
                row
            })
            .collect();

        Ok(rows)
    }
}

/// A fitted seasonal regression. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedSeasonalRegression {
    basis: Basis,
    y_scale: f64,
    /// Coefficients on the scaled design, in column order
    coefficients: Vec<f64>,
    regressor_names: Vec<String>,
    /// Regressor effects per raw unit, in target units
    coefficient_draws: Vec<Vec<f64>>,
    training_len: usize,
}

impl FittedSeasonalRegression {
    /// Start of the fit window
    pub fn origin(&self) -> NaiveDateTime {
        self.basis.t0
    }

    /// Trend level at the start of the fit window, in target units
    pub fn intercept(&self) -> f64 {
        self.y_scale * self.coefficients[0]
    }

    /// Trend change per day, in target units
    pub fn slope_per_day(&self) -> f64 {
        self.y_scale * self.coefficients[1] * SECONDS_PER_DAY / self.basis.span_seconds
    }

    /// Seasonal Fourier coefficients on the scaled target
    pub fn seasonal_coefficients(&self) -> &[f64] {
        &self.coefficients[2..2 + 2 * self.basis.yearly_order]
    }
}

impl ForecastModel for SeasonalRegression {
    type Trained = FittedSeasonalRegression;

    fn train(&self, series: &CleanedSeries) -> Result<Self::Trained> {
        self.validate()?;

        let n = series.len();
        if n < 2 {
            return Err(ForecastError::ModelFitError(format!(
                "need at least 2 observations to fit a trend, got {}",
                n
            )));
        }

        let timestamps = series.timestamps();
        let t0 = timestamps[0];
        let span_seconds = (timestamps[n - 1] - t0).num_seconds() as f64;
        if span_seconds <= 0.0 {
            return Err(ForecastError::ModelFitError(
                "observations span no time".to_string(),
            ));
        }

        let targets = series.targets();
        let max_abs = targets.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if !max_abs.is_finite() {
            return Err(ForecastError::ModelFitError(
                "target contains non-finite values".to_string(),
            ));
        }
        let y_scale = if max_abs > 0.0 { max_abs } else { 1.0 };

        let mut standardizers = Vec::with_capacity(series.regressor_names().len());
        for name in series.regressor_names() {
            let column = series.regressor_column(name)?;
            let standardizer = Standardizer::fit(&column).map_err(|e| {
                ForecastError::ModelFitError(format!("regressor '{}': {}", name, e))
            })?;
            if standardizer.is_constant() {
                tracing::warn!(regressor = %name, "regressor has no variance; its effect is fixed at zero");
            }
            standardizers.push(standardizer);
        }

        let basis = Basis {
            t0,
            span_seconds,
            yearly_order: self.yearly_order,
            yearly_period_days: self.yearly_period_days,
            standardizers,
        };

        let frame = series.model_frame();
        let design = basis.design(frame.timestamps(), frame.regressors())?;
        let scaled: Vec<f64> = targets.iter().map(|y| y / y_scale).collect();

        let mut penalties = vec![self.ridge_penalty; basis.width()];
        penalties[0] = 0.0;
        penalties[1] = 0.0;

        let coefficients = ridge_regression(&design, &scaled, &penalties)
            .map_err(|e| ForecastError::ModelFitError(e.to_string()))?;

        let offset = 2 + 2 * basis.yearly_order;
        let raw_effects: Vec<f64> = basis
            .standardizers
            .iter()
            .zip(coefficients[offset..].iter())
            .map(|(s, &g)| y_scale * s.unscale_coefficient(g))
            .collect();

        tracing::debug!(
            observations = n,
            features = basis.width(),
            entity = series.entity_id(),
            "fitted seasonal regression"
        );

        Ok(FittedSeasonalRegression {
            basis,
            y_scale,
            coefficients,
            regressor_names: series.regressor_names().to_vec(),
            coefficient_draws: vec![raw_effects],
            training_len: n,
        })
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}

impl TrainedForecastModel for FittedSeasonalRegression {
    fn predict(&self, frame: &ModelFrame) -> Result<ForecastResult> {
        if frame.regressor_names() != self.regressor_names.as_slice() {
            return Err(ForecastError::SchemaMismatch(format!(
                "model expects regressors {:?}, got {:?}",
                self.regressor_names,
                frame.regressor_names()
            )));
        }

        let design = self.basis.design(frame.timestamps(), frame.regressors())?;
        let values: Vec<f64> = design
            .iter()
            .map(|row| {
                self.y_scale
                    * row
                        .iter()
                        .zip(self.coefficients.iter())
                        .map(|(x, b)| x * b)
                        .sum::<f64>()
            })
            .collect();

        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(
                "prediction produced non-finite values".to_string(),
            ));
        }

        ForecastResult::new(frame.timestamps().to_vec(), values)
    }

    fn regressor_names(&self) -> &[String] {
        &self.regressor_names
    }

    fn regressor_coefficient_draws(&self) -> &[Vec<f64>] {
        &self.coefficient_draws
    }

    fn training_len(&self) -> usize {
        self.training_len
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SalesRecord;
    use chrono::{Duration, NaiveDate};

    fn weekly_series(n: usize, f: impl Fn(usize) -> (f64, Vec<f64>)) -> CleanedSeries {
        let start = NaiveDate::from_ymd_opt(2010, 2, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records = (0..n)
            .map(|i| {
                let (target, regressors) = f(i);
                SalesRecord {
                    entity_id: "1".to_string(),
                    timestamp: start + Duration::weeks(i as i64),
                    target,
                    regressors,
                }
            })
            .collect();
        CleanedSeries::new("1", vec!["x".to_string()], records).unwrap()
    }

    #[test]
    fn test_exact_line_is_reproduced() {
        let series = weekly_series(60, |i| (1000.0 + 5.0 * i as f64, vec![3.0]));
        let model = SeasonalRegression::new().train(&series).unwrap();

        let predicted = model.predict(&series.model_frame()).unwrap();
        for (p, y) in predicted.values().iter().zip(series.targets()) {
            assert!((p - y).abs() < 1e-6, "{} vs {}", p, y);
        }
        assert!((model.slope_per_day() - 5.0 / 7.0).abs() < 1e-9);
        assert!((model.intercept() - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_regressor_effect_in_raw_units() {
        // y = 500 + 40 * x with x alternating between two levels
        let series = weekly_series(80, |i| {
            let x = if i % 2 == 0 { 1.0 } else { 3.0 };
            (500.0 + 40.0 * x, vec![x])
        });
        let model = SeasonalRegression::new()
            .with_yearly_order(0)
            .with_ridge_penalty(0.0)
            .train(&series)
            .unwrap();

        let effect = model.regressor_coefficient_draws()[0][0];
        assert!((effect - 40.0).abs() < 1e-6, "effect {}", effect);
    }

    #[test]
    fn test_single_observation_fails() {
        let series = weekly_series(1, |_| (1.0, vec![1.0]));
        let result = SeasonalRegression::new().train(&series);
        assert!(matches!(result, Err(ForecastError::ModelFitError(_))));
    }

    #[test]
    fn test_predict_rejects_other_regressors() {
        let series = weekly_series(10, |i| (i as f64, vec![i as f64]));
        let model = SeasonalRegression::new().train(&series).unwrap();

        let frame = ModelFrame::new(vec!["other".to_string()], vec![], vec![]).unwrap();
        assert!(matches!(
            model.predict(&frame),
            Err(ForecastError::SchemaMismatch(_))
        ));
    }
}
