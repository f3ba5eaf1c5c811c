//! Narrative report synthesis
//!
//! The forecasting core hands a [`ReportBundle`] to a [`NarrativeGenerator`]
//! and treats the returned text as opaque. Generators that call out to a
//! remote service fail with [`ReportError`], which is kept apart from the
//! core's [`ForecastError`](crate::error::ForecastError).

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub mod chat;
pub mod template;

pub use chat::{ChatCompletionNarrator, API_KEY_ENV};
pub use template::TemplateNarrator;

/// Everything the narrative stage needs about one forecast run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBundle {
    /// Entity (store) identifier
    pub entity_id: String,
    /// Holdout MAPE, percent
    pub mape: f64,
    /// Sum of the future predictions
    pub forecast_total: f64,
    /// Mean of the future predictions
    pub avg_weekly: f64,
    /// Markdown bullet list of regressor effects
    pub regressor_effects: String,
    /// Location of the forecast chart
    pub forecast_plot_path: PathBuf,
}

/// Failures of the narrative collaborator
#[derive(Debug, Error)]
pub enum ReportError {
    /// The API key environment variable is not set
    #[error("Missing credential: {0} environment variable not set")]
    MissingCredential(&'static str),

    /// Generator settings are out of range
    #[error("Invalid report configuration: {0}")]
    InvalidConfig(String),

    /// Transport or HTTP status failure
    #[error("Narrative service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered without usable text
    #[error("Narrative service returned no content")]
    EmptyResponse,
}

/// Turns numeric forecast results into narrative text
pub trait NarrativeGenerator {
    /// Produce a markdown narrative for `bundle`
    fn summarize(&self, bundle: &ReportBundle) -> Result<String, ReportError>;
}

impl<G: NarrativeGenerator + ?Sized> NarrativeGenerator for &G {
    fn summarize(&self, bundle: &ReportBundle) -> Result<String, ReportError> {
        (**self).summarize(bundle)
    }
}

impl<G: NarrativeGenerator + ?Sized> NarrativeGenerator for Box<G> {
    fn summarize(&self, bundle: &ReportBundle) -> Result<String, ReportError> {
        (**self).summarize(bundle)
    }
}

/// Whole-unit amount with thousands separators, truncating toward zero
pub fn format_amount(value: f64) -> String {
    let whole = value.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if whole < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
