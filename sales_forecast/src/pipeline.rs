//! Sequential forecasting pipeline
//!
//! prepare → evaluate + forecast → extract effects → narrate. Each stage
//! consumes the previous stage's output. The first failure aborts the run
//! and is returned unchanged; nothing is retried.

use crate::config::ForecastConfig;
use crate::data::{CleanedSeries, DataPreparer};
use crate::error::ForecastError;
use crate::evaluation::{Evaluation, ForecastEvaluator};
use crate::forecaster::{FutureForecast, FutureForecaster};
use crate::insights::RegressorEffects;
use crate::models::FittedSeasonalRegression;
use crate::report::{NarrativeGenerator, ReportBundle, ReportError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of any pipeline stage
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Numeric outputs of one run, before narration
#[derive(Debug, Clone)]
pub struct ForecastRun {
    /// Cleaned per-entity CSV
    pub cleaned_path: PathBuf,
    /// Holdout evaluation with its evaluation-only model
    pub evaluation: Evaluation<FittedSeasonalRegression>,
    /// Production forecast with its full-history model
    pub forecast: FutureForecast<FittedSeasonalRegression>,
    /// Effects of the production model's regressors
    pub effects: RegressorEffects,
    /// Contract handed to the narrative stage
    pub bundle: ReportBundle,
}

/// A completed run including the narrative
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub run: ForecastRun,
    /// Markdown report
    pub report: String,
}

/// Runs every stage for one entity
#[derive(Debug, Clone)]
pub struct Pipeline<N> {
    config: ForecastConfig,
    narrator: N,
}

impl<N: NarrativeGenerator> Pipeline<N> {
    /// Create a pipeline; the configuration is validated up front
    pub fn new(config: ForecastConfig, narrator: N) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config, narrator })
    }

    /// Active configuration
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Run every stage including narration
    pub fn run<P: AsRef<Path>>(&self, source: P, entity_id: &str) -> Result<PipelineOutput, PipelineError> {
        let run = self.run_forecast(source, entity_id)?;

        tracing::info!(entity = entity_id, "stage 3: report synthesis");
        let report = self.narrator.summarize(&run.bundle)?;

        Ok(PipelineOutput { run, report })
    }

    /// Run the numeric stages only
    pub fn run_forecast<P: AsRef<Path>>(&self, source: P, entity_id: &str) -> Result<ForecastRun, ForecastError> {
        tracing::info!(entity = entity_id, source = %source.as_ref().display(), "stage 1: data preparation");
        let cleaned_path = DataPreparer::new(&self.config).prepare(source, entity_id)?;

        tracing::info!(entity = entity_id, "stage 2: evaluation and forecasting");
        let series = CleanedSeries::from_csv(&cleaned_path, &self.config.columns)?;

        let evaluation =
            ForecastEvaluator::new(self.config.model.clone(), self.config.holdout)?.evaluate(&series)?;
        let forecast = FutureForecaster::new(self.config.model.clone(), self.config.horizon)?
            .forecast(&series, self.config.forecast_plot_path(series.entity_id()))?;

        let effects = RegressorEffects::from_model(&forecast.model)?;

        let bundle = ReportBundle {
            entity_id: series.entity_id().to_string(),
            mape: evaluation.mape,
            forecast_total: forecast.summary.forecast_total,
            avg_weekly: forecast.summary.avg_weekly,
            regressor_effects: effects.to_markdown(),
            forecast_plot_path: forecast.summary.plot_path.clone(),
        };

        Ok(ForecastRun {
            cleaned_path,
            evaluation,
            forecast,
            effects,
            bundle,
        })
    }
}
