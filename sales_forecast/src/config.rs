//! Configuration for the forecasting pipeline and the narrative collaborator

use crate::error::{ForecastError, Result};
use crate::models::seasonal_regression::SeasonalRegression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Periods held out for evaluation and projected into the future
pub const DEFAULT_PERIODS: usize = 52;

/// Column names of the raw store-sales dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    /// Entity (store) identifier column
    pub entity: String,
    /// Timestamp column
    pub timestamp: String,
    /// Target (weekly sales) column
    pub target: String,
    /// Exogenous regressor columns, in model order
    pub regressors: Vec<String>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            entity: "Store".to_string(),
            timestamp: "ds".to_string(),
            target: "y".to_string(),
            regressors: ["Holiday_Flag", "Temperature", "Fuel_Price", "CPI", "Unemployment"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Settings of the forecasting core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Directory receiving the cleaned CSV and plot artifacts
    pub output_dir: PathBuf,
    /// Number of future periods to forecast
    pub horizon: usize,
    /// Number of trailing periods held out for evaluation
    pub holdout: usize,
    /// Dataset column names
    pub columns: ColumnSchema,
    /// Model settings shared by the evaluation and production fits
    pub model: SeasonalRegression,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            horizon: DEFAULT_PERIODS,
            holdout: DEFAULT_PERIODS,
            columns: ColumnSchema::default(),
            model: SeasonalRegression::default(),
        }
    }
}

impl ForecastConfig {
    /// Same settings, different artifact directory
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }
        if self.holdout == 0 {
            return Err(ForecastError::InvalidParameter(
                "Holdout window must be at least 1".to_string(),
            ));
        }
        self.model.validate()
    }

    /// Path of the cleaned per-entity CSV
    pub fn cleaned_data_path(&self, entity_id: &str) -> PathBuf {
        self.output_dir
            .join(format!("store_{}_cleaned_data.csv", artifact_key(entity_id)))
    }

    /// Path of the per-entity forecast plot
    pub fn forecast_plot_path(&self, entity_id: &str) -> PathBuf {
        self.output_dir
            .join(format!("store_{}_forecast_plot.svg", artifact_key(entity_id)))
    }
}

/// Entity ids become part of file names; anything outside `[A-Za-z0-9_-]` is replaced.
fn artifact_key(entity_id: &str) -> String {
    entity_id
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Settings of the text-generation collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Text-generation model identifier
    pub model_name: String,
    /// Sampling randomness for narrative generation
    pub temperature: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            model_name: "gpt-4o".to_string(),
            temperature: 0.4,
        }
    }
}

/// Whole application configuration as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub forecast: ForecastConfig,
    pub reporting_llm: ReportConfig,
}

impl AppConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(text).map_err(|e| ForecastError::ConfigError(e.to_string()))?;
        config.forecast.validate()?;
        Ok(config)
    }

    /// Read a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Read a TOML file, falling back to defaults when it is absent or invalid
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded configuration");
                config
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "using default configuration");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [reporting_llm]
            model_name = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        assert_eq!(config.reporting_llm.model_name, "gpt-4o-mini");
        assert_eq!(config.reporting_llm.temperature, 0.4);
        assert_eq!(config.forecast.horizon, DEFAULT_PERIODS);
        assert_eq!(config.forecast.columns.target, "y");
    }

    #[test]
    fn test_invalid_horizon_is_rejected() {
        let result = AppConfig::from_toml_str("[forecast]\nhorizon = 0\n");
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = AppConfig::load_or_default("/nonexistent/models.toml");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_artifact_paths_are_keyed_by_entity() {
        let config = ForecastConfig::default().with_output_dir("out");
        assert_eq!(
            config.cleaned_data_path("4"),
            PathBuf::from("out/store_4_cleaned_data.csv")
        );
        assert_eq!(
            config.forecast_plot_path("a/b"),
            PathBuf::from("out/store_a_b_forecast_plot.svg")
        );
    }
}
