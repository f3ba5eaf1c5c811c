//! # Sales Forecast
//!
//! Store-level retail sales forecasting with exogenous regressors.
//!
//! ## Stages
//!
//! - **Data preparation**: filter a raw store-sales CSV down to one store and
//!   persist the cleaned subset
//! - **Evaluation**: fit on all but the last 52 periods and score the holdout
//!   window with MAPE
//! - **Forecasting**: refit on the full history, hold regressors at their last
//!   known values and forecast 52 periods ahead, rendering a chart
//! - **Insights**: per-regressor coefficient estimates
//! - **Reporting**: hand the numbers to a pluggable narrative generator
//!
//! ## Quick Start
//!
//! ```no_run
//! use sales_forecast::config::ForecastConfig;
//! use sales_forecast::pipeline::Pipeline;
//! use sales_forecast::report::TemplateNarrator;
//!
//! let config = ForecastConfig::default().with_output_dir("outputs");
//! let pipeline = Pipeline::new(config, TemplateNarrator::new())?;
//!
//! let output = pipeline.run("data/walmart_sales.csv", "1")?;
//! println!("{}", output.report);
//! # Ok::<(), sales_forecast::pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod forecaster;
pub mod insights;
pub mod models;
pub mod pipeline;
pub mod plot;
pub mod report;

// Re-export commonly used types
pub use crate::config::{AppConfig, ColumnSchema, ForecastConfig, ReportConfig};
pub use crate::data::{CleanedSeries, DataPreparer, SalesRecord};
pub use crate::error::ForecastError;
pub use crate::evaluation::{holdout_split, Evaluation, ForecastEvaluator, HoldoutSplit};
pub use crate::forecaster::{project_regressors, ForecastSummary, FutureForecast, FutureForecaster};
pub use crate::insights::RegressorEffects;
pub use crate::models::{ForecastModel, ForecastResult, ModelFrame, SeasonalRegression, TrainedForecastModel};
pub use crate::pipeline::{Pipeline, PipelineError, PipelineOutput};
pub use crate::report::{NarrativeGenerator, ReportBundle, ReportError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
