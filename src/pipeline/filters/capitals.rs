use crate::data_model::Verdict;
use crate::error::{PipelineError, Result};
use crate::executor::Filter;
use crate::utils::text::ratio;

use super::mode::filter_mode;

filter_mode! {
    /// How [`CapitalsFilter`] handles over-capitalised text.
    pub enum CapitalsMode for "Capitals" {
        #[default]
        Normal => "normal",
        /// Lowercase the whole text instead, always accepting.
        Crop => "crop",
    }
}

/// Flags text in which too large a share of the letters are capitals.
///
/// Only ASCII letters are counted. Text is too capital when the share of
/// capitals reaches `percentage` and the number of capitals exceeds
/// `abs_safe_min` (`None` removes that allowance).
#[derive(Debug, Clone)]
pub struct CapitalsFilter {
    percentage: f64,
    mode: CapitalsMode,
    abs_safe_min: Option<usize>,
}

impl CapitalsFilter {
    pub fn new(percentage: f64, mode: CapitalsMode, abs_safe_min: Option<usize>) -> Result<Self> {
        if !(0.0..=1.0).contains(&percentage) {
            return Err(PipelineError::ConfigValidationError(format!(
                "CapitalsFilter: percentage must be between 0.0 and 1.0, got {}",
                percentage
            )));
        }
        Ok(CapitalsFilter {
            percentage,
            mode,
            abs_safe_min,
        })
    }

    fn is_too_capital(&self, text: &str) -> bool {
        let (letters, capitals) = text.chars().fold((0, 0), |(letters, capitals), c| {
            if c.is_ascii_uppercase() {
                (letters + 1, capitals + 1)
            } else if c.is_ascii_lowercase() {
                (letters + 1, capitals)
            } else {
                (letters, capitals)
            }
        });

        let over_safe_min = self.abs_safe_min.map_or(true, |min| capitals > min);
        over_safe_min && ratio(capitals, letters) >= self.percentage && letters > 0
    }
}

impl Default for CapitalsFilter {
    fn default() -> Self {
        CapitalsFilter {
            percentage: 0.3,
            mode: CapitalsMode::Normal,
            abs_safe_min: Some(3),
        }
    }
}

impl Filter for CapitalsFilter {
    fn name(&self) -> &'static str {
        "CapitalsFilter"
    }

    fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>> {
        let too_capital = self.is_too_capital(text);

        Ok(match self.mode {
            CapitalsMode::Normal => Verdict::new(!too_capital, text),
            CapitalsMode::Crop if too_capital => Verdict::new(true, text.to_lowercase()),
            CapitalsMode::Crop => Verdict::pass(text),
        })
    }
}
