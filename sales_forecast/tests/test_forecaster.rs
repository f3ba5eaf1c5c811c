mod common;

use approx::assert_relative_eq;
use chrono::Duration;
use common::{linear_row, noisy_row, weekly_series};
use pretty_assertions::assert_eq;
use sales_forecast::error::ForecastError;
use sales_forecast::evaluation::ForecastEvaluator;
use sales_forecast::forecaster::{future_timestamps, project_regressors, FutureForecaster};
use sales_forecast::insights::RegressorEffects;
use sales_forecast::models::SeasonalRegression;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_projected_regressors_repeat_last_row() {
    let series = weekly_series("1", 80, noisy_row);
    let frame = project_regressors(&series, 52).unwrap();
    let last = series.last_record().unwrap();

    assert_eq!(frame.len(), 52);
    assert!(frame.regressors().iter().all(|row| row == &last.regressors));
    assert_eq!(frame.timestamps()[0], last.timestamp + Duration::weeks(1));
    assert_eq!(frame.timestamps()[51], last.timestamp + Duration::weeks(52));
}

#[test]
fn test_future_timestamps_require_positive_cadence() {
    let series = weekly_series("1", 3, linear_row);
    let last = series.last_record().unwrap().timestamp;

    assert!(future_timestamps(last, Duration::zero(), 4).is_err());
    assert_eq!(future_timestamps(last, Duration::days(7), 0).unwrap(), vec![]);
}

#[test]
fn test_total_and_average_match_future_values() {
    let dir = TempDir::new().unwrap();
    let series = weekly_series("2", 150, noisy_row);
    let forecast = FutureForecaster::new(SeasonalRegression::default(), 52)
        .unwrap()
        .forecast(&series, dir.path().join("plot.svg"))
        .unwrap();
    let summary = &forecast.summary;

    assert_eq!(summary.future.len(), 52);
    assert_eq!(summary.fitted.len(), 150 + 52);

    let sum: f64 = summary.future.values().iter().sum();
    assert_relative_eq!(summary.forecast_total, sum, max_relative = 1e-12);
    assert_relative_eq!(summary.avg_weekly, sum / 52.0, max_relative = 1e-12);
    assert!(summary.future.timestamps()[0] > series.last_record().unwrap().timestamp);
}

#[test]
fn test_linear_trend_is_extended() {
    let dir = TempDir::new().unwrap();
    let series = weekly_series("4", 210, linear_row);
    let forecast = FutureForecaster::new(SeasonalRegression::default(), 52)
        .unwrap()
        .forecast(&series, dir.path().join("plot.svg"))
        .unwrap();

    let expected: f64 = (1..=52).map(|k| 1_000_000.0 + 2_000.0 * (209 + k) as f64).sum();
    assert_relative_eq!(forecast.summary.forecast_total, expected, max_relative = 1e-4);
    assert_relative_eq!(forecast.summary.future.values()[0], 1_420_000.0, max_relative = 1e-4);
}

#[test]
fn test_plot_is_written() {
    let dir = TempDir::new().unwrap();
    let plot_path = dir.path().join("charts").join("store_3_forecast_plot.svg");
    let series = weekly_series("3", 120, noisy_row);

    let forecast = FutureForecaster::new(SeasonalRegression::default(), 52)
        .unwrap()
        .forecast(&series, plot_path.clone())
        .unwrap();

    assert_eq!(forecast.summary.plot_path, plot_path);
    let svg = fs::read_to_string(&plot_path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Store 3"));
    assert!(svg.contains("polyline"));
}

#[test]
fn test_production_model_differs_from_evaluation_model() {
    let dir = TempDir::new().unwrap();
    let series = weekly_series("1", 210, noisy_row);

    let evaluation = ForecastEvaluator::new(SeasonalRegression::default(), 52)
        .unwrap()
        .evaluate(&series)
        .unwrap();
    let forecast = FutureForecaster::new(SeasonalRegression::default(), 52)
        .unwrap()
        .forecast(&series, dir.path().join("plot.svg"))
        .unwrap();

    let evaluated = RegressorEffects::from_model(&evaluation.model).unwrap();
    let production = RegressorEffects::from_model(&forecast.model).unwrap();
    let fuel_eval = evaluated.get("Fuel_Price").unwrap();
    let fuel_prod = production.get("Fuel_Price").unwrap();

    assert!((fuel_eval - fuel_prod).abs() > 1e-6);
}

#[test]
fn test_forecast_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let series = weekly_series("1", 160, noisy_row);
    let forecaster = FutureForecaster::new(SeasonalRegression::default(), 52).unwrap();

    let first = forecaster.forecast(&series, dir.path().join("a.svg")).unwrap();
    let second = forecaster.forecast(&series, dir.path().join("b.svg")).unwrap();

    assert_eq!(first.summary.future.values(), second.summary.future.values());
    assert_eq!(
        fs::read_to_string(dir.path().join("a.svg")).unwrap(),
        fs::read_to_string(dir.path().join("b.svg")).unwrap()
    );
}

#[test]
fn test_zero_horizon_is_rejected() {
    assert!(matches!(
        FutureForecaster::new(SeasonalRegression::default(), 0),
        Err(ForecastError::InvalidParameter(_))
    ));
}
