//! Production forecast over the future horizon

use crate::data::CleanedSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, ModelFrame, TrainedForecastModel};
use crate::plot::ForecastPlot;
use chrono::{Duration, NaiveDateTime};
use std::path::PathBuf;

/// Create `horizon` timestamps following `last` at a fixed cadence
pub fn future_timestamps(
    last: NaiveDateTime,
    cadence: Duration,
    horizon: usize,
) -> Result<Vec<NaiveDateTime>> {
    if cadence <= Duration::zero() {
        return Err(ForecastError::InvalidParameter(
            "Cadence must be positive".to_string(),
        ));
    }

    let mut timestamps = Vec::with_capacity(horizon);
    let mut current = last;
    for _ in 0..horizon {
        current = current.checked_add_signed(cadence).ok_or_else(|| {
            ForecastError::InvalidParameter("future timestamps overflow the calendar".to_string())
        })?;
        timestamps.push(current);
    }

    Ok(timestamps)
}

/// Future frame holding every regressor at its most recent observed value.
///
/// This is a placeholder for unknown future inputs, not a forecast of them.
pub fn project_regressors(series: &CleanedSeries, horizon: usize) -> Result<ModelFrame> {
    let last = series
        .last_record()
        .ok_or_else(|| ForecastError::EmptySelection {
            entity_id: series.entity_id().to_string(),
        })?;

    let timestamps = future_timestamps(last.timestamp, series.cadence()?, horizon)?;
    let rows = vec![last.regressors.clone(); horizon];

    ModelFrame::new(series.regressor_names().to_vec(), timestamps, rows)
}

/// Aggregated production forecast
#[derive(Debug, Clone)]
pub struct ForecastSummary {
    /// Model output over the history and the future horizon
    pub fitted: ForecastResult,
    /// Predictions for the future horizon only
    pub future: ForecastResult,
    /// Projected regressors used for the future horizon
    pub projected_regressors: ModelFrame,
    /// Sum of the future predictions
    pub forecast_total: f64,
    /// Mean of the future predictions
    pub avg_weekly: f64,
    /// Location of the rendered chart
    pub plot_path: PathBuf,
}

/// Production model plus its forecast
#[derive(Debug, Clone)]
pub struct FutureForecast<T> {
    /// Model fitted on the full series
    pub model: T,
    /// Forecast outputs
    pub summary: ForecastSummary,
}

/// Fits on the whole series and projects it forward
#[derive(Debug, Clone)]
pub struct FutureForecaster<M: ForecastModel> {
    model: M,
    horizon: usize,
}

impl<M: ForecastModel> FutureForecaster<M> {
    /// Create a new forecaster
    pub fn new(model: M, horizon: usize) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }
        Ok(Self { model, horizon })
    }

    /// Fit a fresh model on every row of `series`, forecast the horizon and
    /// write the chart to `plot_path`
    pub fn forecast(&self, series: &CleanedSeries, plot_path: PathBuf) -> Result<FutureForecast<M::Trained>> {
        let model = self.model.train(series)?;

        let projected = project_regressors(series, self.horizon)?;
        let frame = series.model_frame().concat(projected.clone())?;
        let fitted = model.predict(&frame)?;

        let future = fitted.tail(self.horizon);
        let forecast_total = future.total();
        let avg_weekly = future.average()?;

        let history_timestamps = series.timestamps();
        let history_values = series.targets();
        ForecastPlot {
            title: format!("{}-Period Sales Forecast for Store {}", self.horizon, series.entity_id()),
            history_timestamps: &history_timestamps,
            history_values: &history_values,
            forecast: &fitted,
            forecast_start: future.timestamps().first().copied(),
        }
        .write(&plot_path)?;

        tracing::info!(
            entity = series.entity_id(),
            horizon = self.horizon,
            forecast_total,
            avg_weekly,
            plot = %plot_path.display(),
            "future forecast done"
        );

        Ok(FutureForecast {
            model,
            summary: ForecastSummary {
                fitted,
                future,
                projected_regressors: projected,
                forecast_total,
                avg_weekly,
                plot_path,
            },
        })
    }
}
