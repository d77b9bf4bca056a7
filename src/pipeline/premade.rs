//! Ready-made pipelines for two common settings: short chat messages and
//! long-form articles.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::executor::{Filter, Pipeline, PipelineMode};
use crate::pipeline::filters::{
    BlocklistFilter, BlocklistMode, BypassDetector, CapitalsFilter, CapitalsMode, LengthFilter,
    LengthMode, SpecialCharsFilter, WordLengthFilter, WordLengthMode,
};

/// Which filters a premade pipeline carries and how they are tuned.
///
/// Filters are added in a fixed order: bypass detector, length, word length,
/// capitals, special characters, blocklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremadeOptions {
    pub bypass_protection: bool,
    pub length_filter: bool,
    pub min_length: usize,
    pub max_length: usize,
    pub wordlength_filter: bool,
    pub max_word_length: usize,
    pub max_num_too_long_words: usize,
    pub capitals_filter: bool,
    pub capitals_percentage: f64,
    pub capitals_mode: CapitalsMode,
    pub specialchars_filter: bool,
    pub profanity_filter: bool,
    pub profanity_blocklist_filepath: Option<PathBuf>,
}

/// Options for [`chat_pipeline`]: fast-paced chat, forgiving about shouting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatOptions(pub PremadeOptions);

/// Options for [`article_pipeline`]: demanding writing platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleOptions(pub PremadeOptions);

impl Default for PremadeOptions {
    fn default() -> Self {
        ChatOptions::default().0
    }
}

impl Default for ChatOptions {
    fn default() -> Self {
        ChatOptions(PremadeOptions {
            bypass_protection: true,
            length_filter: true,
            min_length: 1,
            max_length: 200,
            wordlength_filter: true,
            max_word_length: 20,
            max_num_too_long_words: 1,
            capitals_filter: true,
            capitals_percentage: 0.3,
            capitals_mode: CapitalsMode::Crop,
            specialchars_filter: true,
            profanity_filter: false,
            profanity_blocklist_filepath: None,
        })
    }
}

impl Default for ArticleOptions {
    fn default() -> Self {
        ArticleOptions(PremadeOptions {
            bypass_protection: true,
            length_filter: true,
            min_length: 400,
            max_length: 300_000,
            wordlength_filter: true,
            max_word_length: 50,
            max_num_too_long_words: 3,
            capitals_filter: true,
            capitals_percentage: 0.4,
            capitals_mode: CapitalsMode::Normal,
            specialchars_filter: true,
            profanity_filter: false,
            profanity_blocklist_filepath: None,
        })
    }
}

impl ChatOptions {
    /// Switches the profanity filter on with the given JSON blocklist.
    pub fn with_blocklist(mut self, path: impl Into<PathBuf>) -> Self {
        self.0.profanity_filter = true;
        self.0.profanity_blocklist_filepath = Some(path.into());
        self
    }
}

impl ArticleOptions {
    /// Switches the profanity filter on with the given JSON blocklist.
    pub fn with_blocklist(mut self, path: impl Into<PathBuf>) -> Self {
        self.0.profanity_filter = true;
        self.0.profanity_blocklist_filepath = Some(path.into());
        self
    }
}

/// Builds the filters `options` switch on, in the fixed premade order.
pub fn construct_filter_list(options: &PremadeOptions) -> Result<Vec<Arc<dyn Filter>>> {
    let mut filters: Vec<Arc<dyn Filter>> = Vec::new();

    if options.bypass_protection {
        filters.push(Arc::new(BypassDetector::default()));
    }
    if options.length_filter {
        filters.push(Arc::new(LengthFilter::new(
            options.min_length,
            options.max_length,
            LengthMode::Normal,
        )?));
    }
    if options.wordlength_filter {
        filters.push(Arc::new(
            WordLengthFilter::new(
                options.max_word_length,
                WordLengthMode::Absolute,
                options.max_num_too_long_words,
                0.1,
            )?,
        ));
    }
    if options.capitals_filter {
        filters.push(Arc::new(CapitalsFilter::new(
            options.capitals_percentage,
            options.capitals_mode,
            Some(3),
        )?));
    }
    if options.specialchars_filter {
        filters.push(Arc::new(SpecialCharsFilter::default()));
    }
    if options.profanity_filter {
        let path = options.profanity_blocklist_filepath.as_ref().ok_or_else(|| {
            PipelineError::ConfigError(
                "The profanity filter is enabled but no blocklist file was given".to_string(),
            )
        })?;
        filters.push(Arc::new(BlocklistFilter::from_json_file(
            path,
            BlocklistMode::Normal,
        )?));
    }

    debug!(filters = filters.len(), "Constructed premade filter list");
    Ok(filters)
}

/// A `NormalQuick` pipeline for chat messages.
pub fn chat_pipeline(options: ChatOptions) -> Result<Pipeline> {
    Ok(Pipeline::new(
        construct_filter_list(&options.0)?,
        PipelineMode::NormalQuick,
    ))
}

/// A `ZeroTolerance` pipeline for articles: any correction fails the text.
pub fn article_pipeline(options: ArticleOptions) -> Result<Pipeline> {
    Ok(Pipeline::new(
        construct_filter_list(&options.0)?,
        PipelineMode::ZeroTolerance,
    ))
}
