//! Offline narrative built from a fixed markdown layout

use super::{format_amount, NarrativeGenerator, ReportBundle, ReportError};

/// Deterministic narrative generator that needs no network access
#[derive(Debug, Clone, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    /// Create a new template narrator
    pub fn new() -> Self {
        Self
    }
}

impl NarrativeGenerator for TemplateNarrator {
    fn summarize(&self, bundle: &ReportBundle) -> Result<String, ReportError> {
        let effects = if bundle.regressor_effects.trim().is_empty() {
            "- No regressors were included in the model.".to_string()
        } else {
            bundle.regressor_effects.clone()
        };

        Ok(format!(
            "# Sales Forecast Briefing: Store {entity}\n\
             \n\
             ## Model Accuracy\n\
             \n\
             - **MAPE (Mean Absolute Percentage Error):** {mape:.2}%\n\
             - Measured on the most recent holdout window using actual regressor values.\n\
             \n\
             ## Forecast Summary\n\
             \n\
             - **Total Forecasted Sales:** ${total}\n\
             - **Average Weekly Sales:** ${avg}\n\
             - Future regressors are held at their last observed values.\n\
             \n\
             ## Regressor Effects\n\
             \n\
             {effects}\n\
             \n\
             Coefficients are in sales units per unit of each regressor.\n\
             \n\
             ## Forecast Plot\n\
             \n\
             ![Forecast for Store {entity}]({plot})\n",
            entity = bundle.entity_id,
            mape = bundle.mape,
            total = format_amount(bundle.forecast_total),
            avg = format_amount(bundle.avg_weekly),
            effects = effects,
            plot = bundle.forecast_plot_path.display(),
        ))
    }
}
