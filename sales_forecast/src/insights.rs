//! Per-regressor effect estimates of a fitted model

use crate::error::{ForecastError, Result};
use crate::models::TrainedForecastModel;
use serde::Serialize;
use std::fmt;

/// Estimated effect of one regressor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressorEffect {
    /// Regressor name
    pub name: String,
    /// Change in the target per unit of the regressor
    pub coefficient: f64,
}

/// Effects of every regressor, in model order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressorEffects {
    effects: Vec<RegressorEffect>,
}

impl RegressorEffects {
    /// Average each regressor's coefficient over the model's draws
    pub fn from_model<T: TrainedForecastModel>(model: &T) -> Result<Self> {
        let names = model.regressor_names();
        let draws = model.regressor_coefficient_draws();
        if draws.is_empty() {
            return Err(ForecastError::DataError(
                "model exposes no coefficient estimates".to_string(),
            ));
        }
        if let Some(draw) = draws.iter().find(|d| d.len() != names.len()) {
            return Err(ForecastError::DataError(format!(
                "coefficient draw has {} values for {} regressors",
                draw.len(),
                names.len()
            )));
        }

        let effects = names
            .iter()
            .enumerate()
            .map(|(i, name)| RegressorEffect {
                name: name.clone(),
                coefficient: draws.iter().map(|d| d[i]).sum::<f64>() / draws.len() as f64,
            })
            .collect();

        Ok(Self { effects })
    }

    /// All effects
    pub fn effects(&self) -> &[RegressorEffect] {
        &self.effects
    }

    /// Coefficient of one regressor
    pub fn get(&self, name: &str) -> Option<f64> {
        self.effects
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.coefficient)
    }

    /// Markdown bullet list, one line per regressor
    pub fn to_markdown(&self) -> String {
        self.effects
            .iter()
            .map(|e| format!("- **{}:** `{:.2}`", e.name, e.coefficient))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for RegressorEffects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Regressor Effects:")?;
        for effect in &self.effects {
            writeln!(f, "  {:<14} {:>12.4}", effect.name, effect.coefficient)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ForecastResult, ModelFrame};

    #[derive(Debug)]
    struct Draws {
        names: Vec<String>,
        draws: Vec<Vec<f64>>,
    }

    impl TrainedForecastModel for Draws {
        fn predict(&self, _frame: &ModelFrame) -> Result<ForecastResult> {
            ForecastResult::new(vec![], vec![])
        }

        fn regressor_names(&self) -> &[String] {
            &self.names
        }

        fn regressor_coefficient_draws(&self) -> &[Vec<f64>] {
            &self.draws
        }

        fn training_len(&self) -> usize {
            0
        }

        fn name(&self) -> &str {
            "draws"
        }
    }

    #[test]
    fn test_effects_average_over_draws() {
        let model = Draws {
            names: vec!["CPI".to_string(), "Temperature".to_string()],
            draws: vec![vec![10.0, -2.0], vec![20.0, -4.0]],
        };
        let effects = RegressorEffects::from_model(&model).unwrap();

        assert_eq!(effects.get("CPI"), Some(15.0));
        assert_eq!(effects.get("Temperature"), Some(-3.0));
        assert_eq!(effects.get("Fuel_Price"), None);
        assert_eq!(
            effects.to_markdown(),
            "- **CPI:** `15.00`\n- **Temperature:** `-3.00`"
        );
    }

    #[test]
    fn test_missing_draws_are_rejected() {
        let model = Draws {
            names: vec!["CPI".to_string()],
            draws: vec![],
        };
        assert!(RegressorEffects::from_model(&model).is_err());

        let model = Draws {
            names: vec!["CPI".to_string()],
            draws: vec![vec![1.0, 2.0]],
        };
        assert!(RegressorEffects::from_model(&model).is_err());
    }
}
