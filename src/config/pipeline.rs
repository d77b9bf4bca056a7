use crate::error::{PipelineError, Result};
use crate::executor::PipelineMode;
use crate::pipeline::filters::{
    ApiMethod, BlocklistMode, CapitalsMode, LengthMode, LlmMode, RegexMode, ResponsePointers,
    SpecialCharsMode, SymbolDefinition, WordLengthMode, OLLAMA_HOST, OPENAI_BASE_URL,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Represents the overall pipeline configuration read from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct PipelineConfig {
    #[serde(default)]
    pub mode: PipelineMode,
    pub pipeline: Vec<FilterConfig>,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        for filter_config in &self.pipeline {
            filter_config.validate()?;
        }
        Ok(())
    }
}

/// A single filter of the pipeline. The `type` field in YAML selects the variant.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum FilterConfig {
    Length(LengthParams),
    Capitals(CapitalsParams),
    SpecialChars(SpecialCharsParams),
    BypassDetector(BypassDetectorParams),
    WordLength(WordLengthParams),
    Blocklist(BlocklistParams),
    Regex(RegexParams),
    Email(EmailParams),
    Api(ApiParams),
    OpenAi(OpenAiParams),
    Ollama(OllamaParams),
}

impl FilterConfig {
    /// Returns the `type` name of the filter.
    pub fn name(&self) -> &'static str {
        match self {
            FilterConfig::Length(_) => "Length",
            FilterConfig::Capitals(_) => "Capitals",
            FilterConfig::SpecialChars(_) => "SpecialChars",
            FilterConfig::BypassDetector(_) => "BypassDetector",
            FilterConfig::WordLength(_) => "WordLength",
            FilterConfig::Blocklist(_) => "Blocklist",
            FilterConfig::Regex(_) => "Regex",
            FilterConfig::Email(_) => "Email",
            FilterConfig::Api(_) => "Api",
            FilterConfig::OpenAi(_) => "OpenAi",
            FilterConfig::Ollama(_) => "Ollama",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            FilterConfig::Length(params) => params.validate(),
            FilterConfig::Capitals(params) => params.validate(),
            FilterConfig::SpecialChars(params) => params.validate(),
            FilterConfig::BypassDetector(params) => params.validate(),
            FilterConfig::WordLength(params) => params.validate(),
            FilterConfig::Blocklist(params) => params.validate(),
            FilterConfig::Regex(params) => params.validate(),
            FilterConfig::Email(_) => Ok(()),
            FilterConfig::Api(params) => params.validate(),
            FilterConfig::OpenAi(params) => params.validate(),
            FilterConfig::Ollama(params) => params.validate(),
        }
    }
}

fn check_fraction(params: &str, name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PipelineError::ConfigValidationError(format!(
            "{}: {} must be between 0.0 and 1.0, got {}",
            params, name, value
        )));
    }
    Ok(())
}

fn check_timeout(params: &str, timeout: f64) -> Result<()> {
    if !(timeout.is_finite() && timeout > 0.0) {
        return Err(PipelineError::ConfigValidationError(format!(
            "{}: timeout must be a positive number of seconds, got {}",
            params, timeout
        )));
    }
    Ok(())
}

fn check_not_empty(params: &str, name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PipelineError::ConfigValidationError(format!(
            "{}: {} must not be empty",
            params, name
        )));
    }
    Ok(())
}

fn default_timeout() -> f64 {
    3.0
}

/// Parameters for the LengthFilter.
#[derive(Deserialize, Debug, Clone)]
pub struct LengthParams {
    #[serde(default = "LengthParams::default_min_length")]
    pub min_length: usize,
    #[serde(default = "LengthParams::default_max_length")]
    pub max_length: usize,
    /// Single character used to pad short text in crop mode.
    pub padding: Option<String>,
    #[serde(default)]
    pub mode: LengthMode,
}

impl LengthParams {
    fn default_min_length() -> usize {
        10
    }

    fn default_max_length() -> usize {
        200
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_length > self.max_length {
            return Err(PipelineError::ConfigValidationError(format!(
                "LengthParams: min_length ({}) must not exceed max_length ({})",
                self.min_length, self.max_length
            )));
        }
        if let Some(padding) = &self.padding {
            if padding.chars().count() != 1 {
                return Err(PipelineError::ConfigValidationError(format!(
                    "LengthParams: padding must be exactly one character long, got {:?}",
                    padding
                )));
            }
        }
        Ok(())
    }
}

/// Parameters for the CapitalsFilter. `abs_safe_min: ~` disables the safe minimum.
#[derive(Deserialize, Debug, Clone)]
pub struct CapitalsParams {
    #[serde(default = "CapitalsParams::default_percentage")]
    pub percentage: f64,
    #[serde(default)]
    pub mode: CapitalsMode,
    #[serde(default = "CapitalsParams::default_abs_safe_min")]
    pub abs_safe_min: Option<usize>,
}

impl CapitalsParams {
    fn default_percentage() -> f64 {
        0.3
    }

    fn default_abs_safe_min() -> Option<usize> {
        Some(3)
    }

    pub fn validate(&self) -> Result<()> {
        check_fraction("CapitalsParams", "percentage", self.percentage)
    }
}

/// Parameters for the SpecialCharsFilter.
#[derive(Deserialize, Debug, Clone)]
pub struct SpecialCharsParams {
    #[serde(default = "SpecialCharsParams::default_percentage")]
    pub percentage: f64,
    #[serde(default)]
    pub mode: SpecialCharsMode,
    #[serde(default)]
    pub definition: SymbolDefinition,
    #[serde(default = "SpecialCharsParams::default_abs_safe_min")]
    pub abs_safe_min: usize,
}

impl SpecialCharsParams {
    fn default_percentage() -> f64 {
        0.15
    }

    fn default_abs_safe_min() -> usize {
        3
    }

    pub fn validate(&self) -> Result<()> {
        check_fraction("SpecialCharsParams", "percentage", self.percentage)
    }
}

/// Parameters for the BypassDetector.
#[derive(Deserialize, Debug, Clone)]
pub struct BypassDetectorParams {
    #[serde(default = "BypassDetectorParams::default_percentage")]
    pub percentage: f64,
    /// 0 disables the absolute limit.
    #[serde(default = "BypassDetectorParams::default_max_findings")]
    pub max_findings: usize,
}

impl BypassDetectorParams {
    fn default_percentage() -> f64 {
        0.4
    }

    fn default_max_findings() -> usize {
        5
    }

    pub fn validate(&self) -> Result<()> {
        check_fraction("BypassDetectorParams", "percentage", self.percentage)
    }
}

/// Parameters for the WordLengthFilter.
#[derive(Deserialize, Debug, Clone)]
pub struct WordLengthParams {
    #[serde(default = "WordLengthParams::default_max_length")]
    pub max_length: usize,
    #[serde(default)]
    pub mode: WordLengthMode,
    #[serde(default = "WordLengthParams::default_max_abs_population")]
    pub max_abs_population: usize,
    #[serde(default = "WordLengthParams::default_max_perc_population")]
    pub max_perc_population: f64,
}

impl WordLengthParams {
    fn default_max_length() -> usize {
        20
    }

    fn default_max_abs_population() -> usize {
        1
    }

    fn default_max_perc_population() -> f64 {
        0.1
    }

    pub fn validate(&self) -> Result<()> {
        check_fraction(
            "WordLengthParams",
            "max_perc_population",
            self.max_perc_population,
        )
    }
}

/// Parameters for the BlocklistFilter. Terms listed inline and terms read from
/// `file` (a JSON array of strings) are combined.
#[derive(Deserialize, Debug, Clone)]
pub struct BlocklistParams {
    #[serde(default)]
    pub terms: Vec<String>,
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub mode: BlocklistMode,
}

impl BlocklistParams {
    pub fn validate(&self) -> Result<()> {
        if self.terms.is_empty() && self.file.is_none() {
            return Err(PipelineError::ConfigValidationError(
                "BlocklistParams: either terms or file must be provided".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters for the RegexFilter.
#[derive(Deserialize, Debug, Clone)]
pub struct RegexParams {
    pub expression: String,
    #[serde(default)]
    pub mode: RegexMode,
    #[serde(default = "RegexParams::default_replacement")]
    pub replacement: String,
    #[serde(default)]
    pub case_insensitive: bool,
    #[serde(default)]
    pub multiline: bool,
}

impl RegexParams {
    fn default_replacement() -> String {
        "***".to_string()
    }

    pub fn validate(&self) -> Result<()> {
        check_not_empty("RegexParams", "expression", &self.expression)?;
        regex::Regex::new(&self.expression).map_err(|e| {
            PipelineError::ConfigValidationError(format!(
                "RegexParams: invalid expression '{}': {}",
                self.expression, e
            ))
        })?;
        Ok(())
    }
}

/// Parameters for the e-mail address filter.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct EmailParams {
    #[serde(default)]
    pub mode: RegexMode,
}

/// Parameters for the ApiFilter. The text is sent as `{<payload_field>: text}`.
#[derive(Deserialize, Debug, Clone)]
pub struct ApiParams {
    pub url: String,
    #[serde(default)]
    pub method: ApiMethod,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_timeout")]
    pub timeout: f64,
    #[serde(default = "ApiParams::default_payload_field")]
    pub payload_field: String,
    #[serde(default)]
    pub response: ResponsePointers,
}

impl ApiParams {
    fn default_payload_field() -> String {
        "text".to_string()
    }

    pub fn validate(&self) -> Result<()> {
        check_not_empty("ApiParams", "url", &self.url)?;
        check_not_empty("ApiParams", "payload_field", &self.payload_field)?;
        check_timeout("ApiParams", self.timeout)
    }
}

/// Parameters for the OpenAiFilter.
///
/// The key is taken from `api_key`, or else from the environment variable
/// named by `api_key_env`.
#[derive(Deserialize, Debug, Clone)]
pub struct OpenAiParams {
    pub model: String,
    #[serde(default)]
    pub mode: LlmMode,
    #[serde(default = "OpenAiParams::default_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout: f64,
    pub prompt: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl OpenAiParams {
    fn default_base_url() -> String {
        OPENAI_BASE_URL.to_string()
    }

    pub fn validate(&self) -> Result<()> {
        check_not_empty("OpenAiParams", "model", &self.model)?;
        check_not_empty("OpenAiParams", "base_url", &self.base_url)?;
        check_timeout("OpenAiParams", self.timeout)
    }
}

/// Parameters for the OllamaFilter.
#[derive(Deserialize, Debug, Clone)]
pub struct OllamaParams {
    pub model: String,
    #[serde(default)]
    pub mode: LlmMode,
    #[serde(default = "OllamaParams::default_host")]
    pub host: String,
    #[serde(default = "default_timeout")]
    pub timeout: f64,
    pub prompt: Option<String>,
    pub temperature: Option<f64>,
}

impl OllamaParams {
    fn default_host() -> String {
        OLLAMA_HOST.to_string()
    }

    pub fn validate(&self) -> Result<()> {
        check_not_empty("OllamaParams", "model", &self.model)?;
        check_not_empty("OllamaParams", "host", &self.host)?;
        check_timeout("OllamaParams", self.timeout)
    }
}

/// Loads, parses and validates a pipeline configuration file.
///
/// JSON files are accepted too, JSON being a subset of YAML.
pub fn load_pipeline_config<P: AsRef<Path>>(config_path: P) -> Result<PipelineConfig> {
    let path_ref = config_path.as_ref();
    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to read pipeline config file '{}': {}",
            path_ref.display(),
            e
        ))
    })?;

    let config: PipelineConfig = serde_yaml::from_str(&config_content).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to parse pipeline config YAML from '{}': {}",
            path_ref.display(),
            e
        ))
    })?;

    config.validate()?; // Validate the loaded configuration

    Ok(config)
}
