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
use super::llm::{chat_messages, default_schema, LlmMode, SpamAssessment, DEFAULT_TEMPERATURE, STD_PROMPT};

pub const OLLAMA_HOST: &str = "http://127.0.0.1:11434";

/// Asks a model served by Ollama whether the text is spam, through `/api/chat`
/// with a structured output `format`.
pub struct OllamaFilter {
    client: Client,
    model: String,
    mode: LlmMode,
    host: String,
    prompt: String,
    temperature: f64,
}

impl OllamaFilter {
    pub fn new(model: impl Into<String>, mode: LlmMode) -> Result<Self> {
        Self::with_options(model, mode, OLLAMA_HOST, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_options(
        model: impl Into<String>,
        mode: LlmMode,
        host: impl Into<String>,
        timeout_secs: f64,
    ) -> Result<Self> {
        let model = model.into();
        if model.is_empty() {
            return Err(PipelineError::ConfigValidationError(
                "OllamaFilter: model must not be empty".to_string(),
            ));
        }
        if !(timeout_secs.is_finite() && timeout_secs > 0.0) {
            return Err(PipelineError::ConfigValidationError(format!(
                "OllamaFilter: timeout must be a positive number of seconds, got {}",
                timeout_secs
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs_f64(timeout_secs))
            .build()?;

        Ok(OllamaFilter {
            client,
            model,
            mode,
            host: host.into(),
            prompt: STD_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn mode(&self) -> LlmMode {
        self.mode
    }

    fn request_body(&self, text: &str) -> Value {
        json!({
            "model": self.model,
            "messages": chat_messages(&self.prompt, text),
            "format": default_schema(self.mode),
            "stream": false,
            "options": { "temperature": self.temperature },
        })
    }
}

impl fmt::Debug for OllamaFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaFilter")
            .field("model", &self.model)
            .field("mode", &self.mode)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl Filter for OllamaFilter {
    fn name(&self) -> &'static str {
        "OllamaFilter"
    }

    fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>> {
        let url = format!("{}/api/chat", self.host.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .json(&self.request_body(text))
            .send()?
            .error_for_status()?;

        let chat: ChatResponse = response.json().map_err(|e| PipelineError::InvalidResponse {
            filter: self.name().to_string(),
            reason: format!("malformed chat response: {}", e),
        })?;
        let content = chat
            .message
            .map(|m| m.content)
            .ok_or_else(|| PipelineError::InvalidResponse {
                filter: self.name().to_string(),
                reason: "chat response has no message".to_string(),
            })?;
        debug!(model = %self.model, content = %content, "Ollama filter answer");

        SpamAssessment::parse(self.name(), &content)?.into_verdict(self.name(), self.mode, text)
    }
}
