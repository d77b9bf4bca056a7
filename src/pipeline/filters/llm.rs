// Shared pieces of the language-model backed filters.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;

use crate::data_model::Verdict;
use crate::error::{PipelineError, Result};

use super::mode::filter_mode;

filter_mode! {
    pub enum LlmMode for "LLM filter" {
        /// Accept iff the model says the text is not spam.
        #[default]
        Normal => "normal",
        /// Additionally replace the text by the model's cleaned version.
        Correcting => "correcting",
    }
}

pub const STD_PROMPT: &str = "You are a spam filter.\nYour task is to determine if the given text is spam or not. Give a definite answer formatted as JSON.";

pub const DEFAULT_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

static JSON_SCHEMA_NORMAL: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "is_spam": {
                "type": "boolean",
                "description": "Whether the given text is spam or not."
            }
        },
        "required": ["is_spam"]
    })
});

static JSON_SCHEMA_CORRECTING: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "is_spam": {
                "type": "boolean",
                "description": "Whether the given text is spam or not."
            },
            "corrected_text": {
                "type": "string",
                "description": "The cleaned version of the text, in case the input contained spam."
            }
        },
        "required": ["is_spam", "corrected_text"]
    })
});

/// The response schema the model is asked to follow in `mode`.
pub fn default_schema(mode: LlmMode) -> Value {
    match mode {
        LlmMode::Normal => JSON_SCHEMA_NORMAL.clone(),
        LlmMode::Correcting => JSON_SCHEMA_CORRECTING.clone(),
    }
}

/// What the model answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpamAssessment {
    pub is_spam: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_text: Option<String>,
}

impl SpamAssessment {
    /// Parses the model's message content.
    pub fn parse(filter: &str, content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| PipelineError::InvalidResponse {
            filter: filter.to_string(),
            reason: format!("model answer is not a spam assessment: {}", e),
        })
    }

    pub fn into_verdict<'a>(self, filter: &str, mode: LlmMode, text: &'a str) -> Result<Verdict<'a>> {
        let accepted = !self.is_spam;
        match mode {
            LlmMode::Normal => Ok(Verdict::new(accepted, text)),
            LlmMode::Correcting => {
                let corrected = self.corrected_text.ok_or_else(|| PipelineError::InvalidResponse {
                    filter: filter.to_string(),
                    reason: "model answer lacks 'corrected_text'".to_string(),
                })?;
                let text = if corrected == text {
                    Cow::Borrowed(text)
                } else {
                    Cow::Owned(corrected)
                };
                Ok(Verdict::new(accepted, text))
            }
        }
    }
}

/// Chat messages sent to the model: the system prompt, then the text.
pub(crate) fn chat_messages(prompt: &str, text: &str) -> Value {
    json!([
        { "role": "system", "content": prompt },
        { "role": "user", "content": text },
    ])
}
