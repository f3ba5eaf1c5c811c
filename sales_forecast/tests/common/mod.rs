//! Synthetic store-sales datasets shared by the integration tests

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use sales_forecast::config::ColumnSchema;
use sales_forecast::data::{CleanedSeries, SalesRecord};
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "Store,ds,y,Holiday_Flag,Temperature,Fuel_Price,CPI,Unemployment";

/// One generated row: target plus the five regressors
pub struct Row {
    pub target: f64,
    pub holiday: f64,
    pub temperature: f64,
    pub fuel_price: f64,
    pub cpi: f64,
    pub unemployment: f64,
}

/// Weekly rows starting on 2010-02-05
pub fn weekly_lines(store: &str, periods: usize, row: impl Fn(usize) -> Row) -> Vec<String> {
    let start = NaiveDate::from_ymd_opt(2010, 2, 5).unwrap();
    (0..periods)
        .map(|i| {
            let r = row(i);
            let date = start + Duration::weeks(i as i64);
            format!(
                "{},{},{},{},{},{},{},{}",
                store,
                date.format("%Y-%m-%d"),
                r.target,
                r.holiday,
                r.temperature,
                r.fuel_price,
                r.cpi,
                r.unemployment
            )
        })
        .collect()
}

/// In-memory series with the default regressor columns
pub fn weekly_series(store: &str, periods: usize, row: impl Fn(usize) -> Row) -> CleanedSeries {
    let start = NaiveDate::from_ymd_opt(2010, 2, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let records = (0..periods)
        .map(|i| {
            let r = row(i);
            SalesRecord {
                entity_id: store.to_string(),
                timestamp: start + Duration::weeks(i as i64),
                target: r.target,
                regressors: vec![r.holiday, r.temperature, r.fuel_price, r.cpi, r.unemployment],
            }
        })
        .collect();

    CleanedSeries::new(store.to_string(), ColumnSchema::default().regressors, records).unwrap()
}

/// Linear sales with regressors frozen at constant values
pub fn linear_row(i: usize) -> Row {
    Row {
        target: 1_000_000.0 + 2_000.0 * i as f64,
        holiday: 0.0,
        temperature: 60.0,
        fuel_price: 3.0,
        cpi: 210.0,
        unemployment: 7.5,
    }
}

/// Trend, yearly cycle, regressor effects and a regime change in the last year
pub fn noisy_row(i: usize) -> Row {
    let t = i as f64;
    let holiday = if i % 52 == 0 || i % 52 == 43 { 1.0 } else { 0.0 };
    let temperature = 60.0 + 20.0 * (2.0 * std::f64::consts::PI * t / 52.18).sin() + (t * 1.7).cos();
    let fuel_price = 2.8 + 0.01 * t + 0.05 * (t * 0.9).sin();
    let cpi = 210.0 + 0.05 * t + 0.2 * (t * 0.5).sin();
    let unemployment = 8.0 - 0.01 * t + 0.1 * (t * 0.3).cos();
    let regime = if i >= 150 { 40_000.0 * (fuel_price - 3.0) } else { 0.0 };
    let noise = 5_000.0 * (t * 12.9898).sin();

    Row {
        target: 1_500_000.0 + 800.0 * t + 60_000.0 * holiday - 1_500.0 * (temperature - 60.0)
            + regime
            + noise,
        holiday,
        temperature,
        fuel_price,
        cpi,
        unemployment,
    }
}

/// Write a dataset with a header and the given rows
pub fn write_dataset(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut text = String::from(HEADER);
    text.push('\n');
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    fs::write(&path, text).unwrap();
    path
}
