//! Holdout evaluation of a forecasting model
//!
//! The most recent `holdout` periods are withheld, a fresh model is fitted on
//! the remainder and scored on the withheld window. Predictions for the
//! window use the rows' actual regressor values, so the score measures skill
//! given true exogenous inputs. The future forecast has to project those
//! inputs instead; the two numbers are not directly comparable.

use crate::data::CleanedSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use chrono::NaiveDateTime;

/// Training prefix and test suffix of a series
#[derive(Debug, Clone)]
pub struct HoldoutSplit {
    /// Rows at or before the split point
    pub train: CleanedSeries,
    /// Rows after the split point
    pub test: CleanedSeries,
    /// `max(timestamp) - holdout * cadence`
    pub split_point: NaiveDateTime,
}

/// Split `series` so that the last `holdout` periods form the test set
pub fn holdout_split(series: &CleanedSeries, holdout: usize) -> Result<HoldoutSplit> {
    let insufficient = ForecastError::InsufficientHistory {
        required: holdout + 1,
        available: series.len(),
    };

    let cadence = match series.cadence() {
        Ok(cadence) => cadence,
        Err(ForecastError::InsufficientHistory { .. }) => return Err(insufficient),
        Err(err) => return Err(err),
    };
    let last = series
        .last_record()
        .map(|r| r.timestamp)
        .ok_or_else(|| ForecastError::EmptySelection {
            entity_id: series.entity_id().to_string(),
        })?;

    let split_point = i32::try_from(holdout)
        .ok()
        .and_then(|periods| cadence.checked_mul(periods))
        .and_then(|window| last.checked_sub_signed(window))
        .ok_or_else(|| {
            ForecastError::InvalidParameter(format!("holdout of {} periods is out of range", holdout))
        })?;

    let (train, test) = series.partition_at(split_point);
    if train.is_empty() || test.is_empty() {
        return Err(insufficient);
    }

    let entity = series.entity_id().to_string();
    let names = series.regressor_names().to_vec();
    Ok(HoldoutSplit {
        train: CleanedSeries::from_sorted(entity.clone(), names.clone(), train),
        test: CleanedSeries::from_sorted(entity, names, test),
        split_point,
    })
}

/// Outcome of a holdout evaluation
#[derive(Debug, Clone)]
pub struct Evaluation<T> {
    /// Mean absolute percentage error on the test window, rounded to 2 decimals
    pub mape: f64,
    /// Number of training periods
    pub train_len: usize,
    /// Number of test periods
    pub test_len: usize,
    /// Last timestamp included in training
    pub split_point: NaiveDateTime,
    /// Predictions for the test window
    pub predictions: ForecastResult,
    /// The evaluation-only model, fitted on the training rows
    pub model: T,
}

/// Scores a model specification on a trailing holdout window
#[derive(Debug, Clone)]
pub struct ForecastEvaluator<M: ForecastModel> {
    model: M,
    holdout: usize,
}

impl<M: ForecastModel> ForecastEvaluator<M> {
    /// Create a new evaluator
    pub fn new(model: M, holdout: usize) -> Result<Self> {
        if holdout == 0 {
            return Err(ForecastError::InvalidParameter(
                "Holdout window must be at least 1".to_string(),
            ));
        }
        Ok(Self { model, holdout })
    }

    /// Fit on the training prefix and score the holdout window
    pub fn evaluate(&self, series: &CleanedSeries) -> Result<Evaluation<M::Trained>> {
        let split = holdout_split(series, self.holdout)?;
        tracing::info!(
            entity = series.entity_id(),
            train = split.train.len(),
            test = split.test.len(),
            split_point = %split.split_point,
            "evaluating on holdout window"
        );

        let model = self.model.train(&split.train)?;
        let predictions = model.predict(&split.test.model_frame())?;
        let mape = predictions.mean_absolute_percentage_error(&split.test.targets())?;
        let mape = round_to(mape, 2);

        tracing::info!(entity = series.entity_id(), mape, model = model.name(), "holdout evaluation done");

        Ok(Evaluation {
            mape,
            train_len: split.train.len(),
            test_len: split.test.len(),
            split_point: split.split_point,
            predictions,
            model,
        })
    }
}

/// Round half away from zero to `decimals` places
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
