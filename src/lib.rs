//! # Shelfcast
//!
//! `shelfcast` forecasts a retail store's next 52 weeks of sales from its
//! weekly history and a handful of exogenous regressors, scores the model on
//! a 52-week holdout and turns the numbers into a short briefing.
//!
//! The work happens in two member crates re-exported here:
//!
//! - [`sales_forecast`]: data preparation, the seasonal regression model,
//!   evaluation, forecasting, plotting and report synthesis
//! - [`forecast_math`]: the numeric kernels underneath
//!
//! ## Example
//!
//! ```no_run
//! use shelfcast::sales_forecast::{ForecastConfig, Pipeline};
//! use shelfcast::sales_forecast::report::TemplateNarrator;
//!
//! let pipeline = Pipeline::new(ForecastConfig::default(), TemplateNarrator::new())?;
//! let output = pipeline.run("data/walmart_sales.csv", "1")?;
//! println!("{}", output.report);
//! # Ok::<(), shelfcast::sales_forecast::PipelineError>(())
//! ```

pub use forecast_math;
pub use sales_forecast;

pub use sales_forecast::{
    AppConfig, ForecastConfig, ForecastError, NarrativeGenerator, Pipeline, PipelineError,
    PipelineOutput, ReportBundle,
};

/// Default location of the model configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/models.toml";

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
