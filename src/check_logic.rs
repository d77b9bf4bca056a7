// src/check_logic.rs

use crate::config::pipeline::{FilterConfig, PipelineConfig};
use crate::config::{load_pipeline_config, Args, Preset};
use crate::error::{PipelineError, Result};
use crate::executor::{Filter, Pipeline, PipelineMode};
use crate::pipeline::filters::{
    ApiFilter, BlocklistFilter, BypassDetector, CapitalsFilter, LengthFilter, OllamaFilter,
    OpenAiFilter, RegexFilter, SpecialCharsFilter, WordLengthFilter,
};
use crate::pipeline::premade::{article_pipeline, chat_pipeline, ArticleOptions, ChatOptions};
use itertools::Itertools;
use serde_json::json;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, info_span, instrument};

/// Builds a single filter from its configuration.
pub fn build_filter(filter_config: &FilterConfig) -> Result<Arc<dyn Filter>> {
    let filter: Arc<dyn Filter> = match filter_config {
        FilterConfig::Length(params) => {
            debug!(params = ?params, "Adding LengthFilter");
            let filter = LengthFilter::new(params.min_length, params.max_length, params.mode)?;
            match &params.padding {
                Some(padding) => Arc::new(filter.with_padding_str(padding)?),
                None => Arc::new(filter),
            }
        }
        FilterConfig::Capitals(params) => {
            debug!(params = ?params, "Adding CapitalsFilter");
            Arc::new(CapitalsFilter::new(
                params.percentage,
                params.mode,
                params.abs_safe_min,
            )?)
        }
        FilterConfig::SpecialChars(params) => {
            debug!(params = ?params, "Adding SpecialCharsFilter");
            Arc::new(SpecialCharsFilter::new(
                params.percentage,
                params.mode,
                params.definition,
                params.abs_safe_min,
            )?)
        }
        FilterConfig::BypassDetector(params) => {
            debug!(params = ?params, "Adding BypassDetector");
            Arc::new(BypassDetector::new(params.percentage, params.max_findings)?)
        }
        FilterConfig::WordLength(params) => {
            debug!(params = ?params, "Adding WordLengthFilter");
            Arc::new(WordLengthFilter::new(
                params.max_length,
                params.mode,
                params.max_abs_population,
                params.max_perc_population,
            )?)
        }
        FilterConfig::Blocklist(params) => {
            debug!(params = ?params, "Adding BlocklistFilter");
            let mut terms = params.terms.clone();
            if let Some(file) = &params.file {
                let from_file = BlocklistFilter::from_json_file(file, params.mode)?;
                terms.extend(from_file.terms().map(str::to_string));
            }
            Arc::new(BlocklistFilter::new(terms, params.mode))
        }
        FilterConfig::Regex(params) => {
            debug!(params = ?params, "Adding RegexFilter");
            Arc::new(
                RegexFilter::builder(&params.expression)
                    .mode(params.mode)
                    .replacement(params.replacement.clone())
                    .case_insensitive(params.case_insensitive)
                    .multiline(params.multiline)
                    .build()?,
            )
        }
        FilterConfig::Email(params) => {
            debug!(params = ?params, "Adding e-mail RegexFilter");
            Arc::new(RegexFilter::email(params.mode))
        }
        FilterConfig::Api(params) => {
            debug!(url = %params.url, method = %params.method, "Adding ApiFilter");
            let field = params.payload_field.clone();
            let mut builder = ApiFilter::builder(params.url.clone())
                .method(params.method)
                .timeout_secs(params.timeout)
                .payload(move |text| json!({ field.as_str(): text }))
                .pointers(params.response.clone());
            for (name, value) in &params.headers {
                builder = builder.header(name.clone(), value.clone());
            }
            Arc::new(builder.build()?)
        }
        FilterConfig::OpenAi(params) => {
            debug!(
                model = %params.model,
                mode = %params.mode,
                base_url = %params.base_url,
                "Adding OpenAiFilter"
            );
            let mut builder = OpenAiFilter::builder(params.model.clone())
                .mode(params.mode)
                .base_url(params.base_url.clone())
                .timeout_secs(params.timeout);
            let api_key =
                resolve_api_key(params.api_key.as_deref(), params.api_key_env.as_deref())?;
            if let Some(api_key) = api_key {
                builder = builder.api_key(api_key);
            }
            if let Some(prompt) = &params.prompt {
                builder = builder.prompt(prompt.clone());
            }
            if let Some(temperature) = params.temperature {
                builder = builder.temperature(temperature);
            }
            if let Some(max_tokens) = params.max_tokens {
                builder = builder.max_tokens(max_tokens);
            }
            Arc::new(builder.build()?)
        }
        FilterConfig::Ollama(params) => {
            debug!(params = ?params, "Adding OllamaFilter");
            let mut filter = OllamaFilter::with_options(
                params.model.clone(),
                params.mode,
                params.host.clone(),
                params.timeout,
            )?;
            if let Some(prompt) = &params.prompt {
                filter = filter.with_prompt(prompt.clone());
            }
            if let Some(temperature) = params.temperature {
                filter = filter.with_temperature(temperature);
            }
            Arc::new(filter)
        }
    };
    Ok(filter)
}

/// An inline key wins over the environment variable.
fn resolve_api_key(inline: Option<&str>, env_var: Option<&str>) -> Result<Option<String>> {
    match (inline, env_var) {
        (Some(key), _) => Ok(Some(key.to_string())),
        (None, Some(var)) => std::env::var(var).map(Some).map_err(|_| {
            PipelineError::ConfigError(format!(
                "Environment variable '{}' holding the API key is not set",
                var
            ))
        }),
        (None, None) => Ok(None),
    }
}

/// Builds the pipeline described by a (validated) configuration.
#[instrument(skip(config), fields(num_filters = config.pipeline.len(), mode = %config.mode))]
pub fn build_pipeline_from_config(config: &PipelineConfig) -> Result<Pipeline> {
    info!("Building pipeline from configuration...");
    let mut filters: Vec<Arc<dyn Filter>> = Vec::with_capacity(config.pipeline.len());

    for (i, filter_config) in config.pipeline.iter().enumerate() {
        let filter_span = info_span!("pipeline_filter", index = i, type = filter_config.name());
        let _enter = filter_span.enter();
        filters.push(build_filter(filter_config)?);
    }

    let order = filters.iter().map(|f| f.name()).join(" -> ");
    info!(filters = %order, "Pipeline built");
    Ok(Pipeline::new(filters, config.mode))
}

/// Builds one of the premade pipelines, with the profanity filter enabled
/// when a blocklist is given.
pub fn build_preset(preset: Preset, blocklist: Option<&Path>) -> Result<Pipeline> {
    info!(preset = ?preset, blocklist = ?blocklist, "Building premade pipeline");
    match preset {
        Preset::Chat => {
            let options = match blocklist {
                Some(path) => ChatOptions::default().with_blocklist(path),
                None => ChatOptions::default(),
            };
            chat_pipeline(options)
        }
        Preset::Article => {
            let options = match blocklist {
                Some(path) => ArticleOptions::default().with_blocklist(path),
                None => ArticleOptions::default(),
            };
            article_pipeline(options)
        }
    }
}

/// Builds the pipeline the command line asks for: from a configuration file
/// or a preset, with an optional mode override.
pub fn build_pipeline_from_args(args: &Args) -> Result<Pipeline> {
    let mut pipeline = match (&args.config, args.preset) {
        (Some(_), _) if args.blocklist.is_some() => {
            return Err(PipelineError::ConfigError(
                "A blocklist file can only be combined with a preset; \
                 add a Blocklist filter to the configuration instead"
                    .to_string(),
            ))
        }
        (Some(path), _) => {
            let config = load_pipeline_config(path)?;
            info!(path = %path.display(), "Loaded pipeline configuration");
            build_pipeline_from_config(&config)?
        }
        (None, Some(preset)) => build_preset(preset, args.blocklist.as_deref())?,
        (None, None) => {
            return Err(PipelineError::ConfigError(
                "Either a configuration file or a preset is required".to_string(),
            ))
        }
    };

    if let Some(mode) = &args.mode {
        let mode: PipelineMode = mode.parse()?;
        debug!(%mode, "Overriding pipeline mode");
        pipeline.set_mode(mode);
    }
    Ok(pipeline)
}

/// Counts of a checking run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub checked: usize,
    pub passed: usize,
}

impl CheckSummary {
    pub fn all_passed(&self) -> bool {
        self.checked == self.passed
    }
}

/// Checks a single message and writes one output line for it.
pub fn check_message<W: Write>(
    pipeline: &Pipeline,
    message: &str,
    out: &mut W,
    as_json: bool,
) -> Result<bool> {
    let result = pipeline.check(message)?;

    if as_json {
        serde_json::to_writer(&mut *out, &result.to_report())?;
        writeln!(out)?;
    } else if result.passed {
        writeln!(out, "PASS\t{}", result.result)?;
    } else {
        writeln!(
            out,
            "FAIL\t[{}]\t{}",
            result.failed_filter_names().join(", "),
            result.result
        )?;
    }

    Ok(result.passed)
}

/// Checks every line of `input` as a separate message.
pub fn check_lines<R: BufRead, W: Write>(
    pipeline: &Pipeline,
    input: R,
    out: &mut W,
    as_json: bool,
) -> Result<CheckSummary> {
    let mut summary = CheckSummary::default();

    for line in input.lines() {
        let line = line?;
        summary.checked += 1;
        if check_message(pipeline, &line, out, as_json)? {
            summary.passed += 1;
        }
    }

    info!(
        checked = summary.checked,
        passed = summary.passed,
        "Finished checking messages"
    );
    Ok(summary)
}
