use crate::data_model::Verdict;
use crate::error::{PipelineError, Result};
use crate::executor::Filter;
use crate::utils::text::{is_letter, ratio, SPECIAL_CHARS};

use super::mode::filter_mode;

filter_mode! {
    pub enum SpecialCharsMode for "SpecialChars" {
        #[default]
        Normal => "normal",
        /// Strip the special characters instead, always accepting.
        Crop => "crop",
    }
}

filter_mode! {
    /// What counts as a special character.
    pub enum SymbolDefinition for "SpecialChars symbol definition" {
        /// ASCII punctuation and `§`.
        #[default]
        Explicit => "explicit",
        /// Anything that is not an ASCII letter, whitespace and digits included.
        Implicit => "implicit",
    }
}

/// Flags text made up of too many special characters.
///
/// Text is acceptable when the share of special characters is at most
/// `percentage`, or when there are no more than `abs_safe_min` of them.
#[derive(Debug, Clone)]
pub struct SpecialCharsFilter {
    percentage: f64,
    mode: SpecialCharsMode,
    definition: SymbolDefinition,
    abs_safe_min: usize,
}

impl SpecialCharsFilter {
    pub fn new(
        percentage: f64,
        mode: SpecialCharsMode,
        definition: SymbolDefinition,
        abs_safe_min: usize,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&percentage) {
            return Err(PipelineError::ConfigValidationError(format!(
                "SpecialCharsFilter: percentage must be between 0.0 and 1.0, got {}",
                percentage
            )));
        }
        Ok(SpecialCharsFilter {
            percentage,
            mode,
            definition,
            abs_safe_min,
        })
    }

    fn is_special(&self, c: char) -> bool {
        match self.definition {
            SymbolDefinition::Explicit => SPECIAL_CHARS.contains(&c),
            SymbolDefinition::Implicit => !is_letter(c),
        }
    }
}

impl Default for SpecialCharsFilter {
    fn default() -> Self {
        SpecialCharsFilter {
            percentage: 0.15,
            mode: SpecialCharsMode::Normal,
            definition: SymbolDefinition::Explicit,
            abs_safe_min: 3,
        }
    }
}

impl Filter for SpecialCharsFilter {
    fn name(&self) -> &'static str {
        "SpecialCharsFilter"
    }

    fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>> {
        let total = text.chars().count();
        let specials = text.chars().filter(|&c| self.is_special(c)).count();
        let acceptable = ratio(specials, total) <= self.percentage || specials <= self.abs_safe_min;

        Ok(match self.mode {
            SpecialCharsMode::Normal => Verdict::new(acceptable, text),
            SpecialCharsMode::Crop if !acceptable => Verdict::new(
                true,
                text.chars()
                    .filter(|&c| !self.is_special(c))
                    .collect::<String>(),
            ),
            SpecialCharsMode::Crop => Verdict::pass(text),
        })
    }
}
