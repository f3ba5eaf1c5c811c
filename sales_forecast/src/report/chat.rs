//! Narrative generation through an OpenAI-compatible chat completions API

use super::{format_amount, NarrativeGenerator, ReportBundle, ReportError};
use crate::config::ReportConfig;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const SYSTEM_PROMPT: &str = "You are a senior retail sales analyst writing forecast briefings \
for executives. Answer in markdown.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Remote narrative generator
#[derive(Debug, Clone)]
pub struct ChatCompletionNarrator {
    client: Client,
    endpoint: String,
    api_key: String,
    config: ReportConfig,
}

impl ChatCompletionNarrator {
    /// Create a narrator with an explicit API key
    pub fn new(api_key: impl Into<String>, config: ReportConfig) -> Result<Self, ReportError> {
        if config.model_name.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "model_name must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&config.temperature) {
            return Err(ReportError::InvalidConfig(format!(
                "temperature {} is outside [0, 2]",
                config.temperature
            )));
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            config,
        })
    }

    /// Create a narrator reading the API key from the process environment
    pub fn from_env(config: ReportConfig) -> Result<Self, ReportError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ReportError::MissingCredential(API_KEY_ENV))?;
        Self::new(api_key, config)
    }

    /// Send requests to another compatible endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Active generator settings
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }
}

/// User message describing one forecast run
pub fn build_prompt(bundle: &ReportBundle) -> String {
    format!(
        "Write an executive sales forecast briefing for Store {entity}.\n\n\
         Model accuracy: holdout MAPE of {mape:.2}%.\n\
         52-week outlook: total forecasted sales ${total}, average weekly sales ${avg}.\n\
         Future regressor values were held at their last observed values.\n\n\
         Regressor coefficients (sales units per unit of regressor):\n{effects}\n\n\
         Explain which drivers push sales up or down, describe the overall \
         trajectory, and give two actionable recommendations.",
        entity = bundle.entity_id,
        mape = bundle.mape,
        total = format_amount(bundle.forecast_total),
        avg = format_amount(bundle.avg_weekly),
        effects = bundle.regressor_effects,
    )
}

impl NarrativeGenerator for ChatCompletionNarrator {
    fn summarize(&self, bundle: &ReportBundle) -> Result<String, ReportError> {
        let request = ChatRequest {
            model: &self.config.model_name,
            temperature: self.config.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(bundle),
                },
            ],
        };

        tracing::info!(model = %self.config.model_name, entity = %bundle.entity_id, "requesting narrative");
        let response: ChatResponse = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ReportError::EmptyResponse)
    }
}
