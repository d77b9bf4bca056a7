use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::data_model::Verdict;
use crate::error::{PipelineError, Result};
use crate::executor::Filter;

use super::api::DEFAULT_TIMEOUT_SECS;
use super::llm::{
    chat_messages, default_schema, LlmMode, SpamAssessment, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE, STD_PROMPT,
};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Asks an OpenAI-compatible chat completions endpoint whether the text is spam.
///
/// Adds a network round trip per check. The model is asked for a structured
/// answer through a JSON schema response format.
pub struct OpenAiFilter {
    client: Client,
    model: String,
    mode: LlmMode,
    base_url: String,
    api_key: Option<String>,
    prompt: String,
    json_schema: Value,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiFilter {
    pub fn builder(model: impl Into<String>) -> OpenAiFilterBuilder {
        OpenAiFilterBuilder {
            model: model.into(),
            mode: LlmMode::default(),
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            prompt: STD_PROMPT.to_string(),
            json_schema: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn mode(&self) -> LlmMode {
        self.mode
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, text: &str) -> Value {
        json!({
            "model": self.model,
            "messages": chat_messages(&self.prompt, text),
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "SpamSchema",
                    "schema": self.json_schema,
                },
            },
            "stream": false,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }
}

impl fmt::Debug for OpenAiFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiFilter")
            .field("model", &self.model)
            .field("mode", &self.mode)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl Filter for OpenAiFilter {
    fn name(&self) -> &'static str {
        "OpenAiFilter"
    }

    fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>> {
        let mut request = self.client.post(self.endpoint()).json(&self.request_body(text));
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send()?.error_for_status()?;
        let completion: ChatCompletion =
            response.json().map_err(|e| PipelineError::InvalidResponse {
                filter: self.name().to_string(),
                reason: format!("malformed chat completion: {}", e),
            })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PipelineError::InvalidResponse {
                filter: self.name().to_string(),
                reason: "chat completion has no message content".to_string(),
            })?;
        debug!(model = %self.model, content = %content, "OpenAI filter answer");

        SpamAssessment::parse(self.name(), &content)?.into_verdict(self.name(), self.mode, text)
    }
}

pub struct OpenAiFilterBuilder {
    model: String,
    mode: LlmMode,
    base_url: String,
    api_key: Option<String>,
    timeout_secs: f64,
    prompt: String,
    json_schema: Option<Value>,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiFilterBuilder {
    pub fn mode(mut self, mode: LlmMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Overrides the schema picked from the mode.
    pub fn json_schema(mut self, schema: Value) -> Self {
        self.json_schema = Some(schema);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn build(self) -> Result<OpenAiFilter> {
        if self.model.is_empty() {
            return Err(PipelineError::ConfigValidationError(
                "OpenAiFilter: model must not be empty".to_string(),
            ));
        }
        if !(self.timeout_secs.is_finite() && self.timeout_secs > 0.0) {
            return Err(PipelineError::ConfigValidationError(format!(
                "OpenAiFilter: timeout must be a positive number of seconds, got {}",
                self.timeout_secs
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs_f64(self.timeout_secs))
            .build()?;

        Ok(OpenAiFilter {
            client,
            json_schema: self.json_schema.unwrap_or_else(|| default_schema(self.mode)),
            model: self.model,
            mode: self.mode,
            base_url: self.base_url,
            api_key: self.api_key,
            prompt: self.prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }
}
