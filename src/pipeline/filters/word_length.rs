use crate::data_model::Verdict;
use crate::error::{PipelineError, Result};
use crate::executor::Filter;
use crate::utils::text::{ratio, split_keep_empty, WORD_DELIMITERS};

use super::mode::filter_mode;

filter_mode! {
    /// Which limit on the number of over-long words applies.
    pub enum WordLengthMode for "WordLength" {
        /// At most `max_abs_population - 1` over-long words.
        #[default]
        Absolute => "absolute",
        /// At most `max_perc_population` of the words may be over-long.
        Percentage => "percentage",
        /// Both limits apply.
        Hybrid => "hybrid",
    }
}

/// Flags text containing words longer than `max_length` characters.
///
/// Words are the pieces between the delimiters in
/// [`WORD_DELIMITERS`](crate::utils::text::WORD_DELIMITERS); empty pieces
/// between adjacent delimiters count as words too. Never changes the text.
#[derive(Debug, Clone)]
pub struct WordLengthFilter {
    max_length: usize,
    mode: WordLengthMode,
    max_abs_population: usize,
    max_perc_population: f64,
}

impl WordLengthFilter {
    pub fn new(
        max_length: usize,
        mode: WordLengthMode,
        max_abs_population: usize,
        max_perc_population: f64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&max_perc_population) {
            return Err(PipelineError::ConfigValidationError(format!(
                "WordLengthFilter: max_perc_population must be between 0.0 and 1.0, got {}",
                max_perc_population
            )));
        }
        Ok(WordLengthFilter {
            max_length,
            mode,
            max_abs_population,
            max_perc_population,
        })
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }
}

impl Default for WordLengthFilter {
    fn default() -> Self {
        WordLengthFilter {
            max_length: 20,
            mode: WordLengthMode::Absolute,
            max_abs_population: 1,
            max_perc_population: 0.1,
        }
    }
}

impl Filter for WordLengthFilter {
    fn name(&self) -> &'static str {
        "WordLengthFilter"
    }

    fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>> {
        let (words, too_long) =
            split_keep_empty(text, WORD_DELIMITERS).fold((0, 0), |(words, too_long), word| {
                if word.chars().count() > self.max_length {
                    (words + 1, too_long + 1)
                } else {
                    (words + 1, too_long)
                }
            });

        let passes_abs = too_long < self.max_abs_population;
        let passes_rel = ratio(too_long, words) <= self.max_perc_population;

        let passed = match self.mode {
            WordLengthMode::Absolute => passes_abs,
            WordLengthMode::Percentage => passes_rel,
            WordLengthMode::Hybrid => passes_abs && passes_rel,
        };

        Ok(Verdict::new(passed, text))
    }
}
