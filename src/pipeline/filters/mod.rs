// src/pipeline/filters/mod.rs

mod mode;

mod api;
mod blocklist;
mod bypass;
mod capitals;
mod length;
mod llm;
mod ollama;
mod openai;
mod regex_filter;
mod special_chars;
mod word_length;

// Text heuristics
pub use blocklist::{BlocklistFilter, BlocklistMode, PROFANITY_REPLACEMENT};
pub use bypass::BypassDetector;
pub use capitals::{CapitalsFilter, CapitalsMode};
pub use length::{LengthFilter, LengthMode};
pub use regex_filter::{RegexFilter, RegexFilterBuilder, RegexMode, EMAIL_PATTERN};
pub use special_chars::{SpecialCharsFilter, SpecialCharsMode, SymbolDefinition};
pub use word_length::{WordLengthFilter, WordLengthMode};

// Network-backed
pub use api::{ApiFilter, ApiFilterBuilder, ApiMethod, InterpretFn, PayloadFn, ResponsePointers};
pub use llm::{default_schema, LlmMode, SpamAssessment, STD_PROMPT};
pub use ollama::{OllamaFilter, OLLAMA_HOST};
pub use openai::{OpenAiFilter, OpenAiFilterBuilder, OPENAI_BASE_URL};
