use crate::data_model::Verdict;
use crate::error::{PipelineError, Result};
use crate::executor::Filter;

use super::mode::filter_mode;

filter_mode! {
    /// How [`LengthFilter`] handles text outside the bounds.
    pub enum LengthMode for "Length" {
        /// Reject too short or too long text.
        #[default]
        Normal => "normal",
        /// Truncate long text and pad short text, always accepting.
        Crop => "crop",
    }
}

/// Checks that the text length, counted in characters, lies within inclusive bounds.
#[derive(Debug, Clone)]
pub struct LengthFilter {
    min_length: usize,
    max_length: usize,
    padding: char,
    mode: LengthMode,
}

impl LengthFilter {
    /// Create a new LengthFilter.
    ///
    /// # Arguments
    /// * `min_length` - the inclusive minimum length
    /// * `max_length` - the inclusive maximum length
    /// * `mode` - reject (`Normal`) or fix up (`Crop`) text outside the bounds
    pub fn new(min_length: usize, max_length: usize, mode: LengthMode) -> Result<Self> {
        if min_length > max_length {
            return Err(PipelineError::ConfigValidationError(format!(
                "LengthFilter: min_length ({}) must not exceed max_length ({})",
                min_length, max_length
            )));
        }
        Ok(LengthFilter {
            min_length,
            max_length,
            padding: ' ',
            mode,
        })
    }

    /// Sets the character used to pad short text in crop mode.
    pub fn with_padding(mut self, padding: char) -> Self {
        self.padding = padding;
        self
    }

    /// Like [`with_padding`](Self::with_padding), for padding given as a
    /// string, which must be exactly one character long.
    pub fn with_padding_str(self, padding: &str) -> Result<Self> {
        let mut chars = padding.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(self.with_padding(c)),
            _ => Err(PipelineError::ConfigValidationError(format!(
                "LengthFilter: padding must be exactly one character long, got {:?}",
                padding
            ))),
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn mode(&self) -> LengthMode {
        self.mode
    }
}

impl Default for LengthFilter {
    fn default() -> Self {
        LengthFilter {
            min_length: 10,
            max_length: 200,
            padding: ' ',
            mode: LengthMode::Normal,
        }
    }
}

impl Filter for LengthFilter {
    fn name(&self) -> &'static str {
        "LengthFilter"
    }

    fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>> {
        let len = text.chars().count();

        match self.mode {
            LengthMode::Normal => Ok(Verdict::new(
                (self.min_length..=self.max_length).contains(&len),
                text,
            )),
            LengthMode::Crop if len < self.min_length => {
                let mut padded = String::with_capacity(text.len() + self.min_length - len);
                padded.push_str(text);
                padded.extend(std::iter::repeat(self.padding).take(self.min_length - len));
                Ok(Verdict::new(true, padded))
            }
            LengthMode::Crop if len > self.max_length => Ok(Verdict::new(
                true,
                text.chars().take(self.max_length).collect::<String>(),
            )),
            LengthMode::Crop => Ok(Verdict::pass(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_mode_bounds_are_inclusive() {
        let filter = LengthFilter::new(3, 5, LengthMode::Normal).unwrap();
        assert!(!filter.check("ab").unwrap().accepted);
        assert!(filter.check("abc").unwrap().accepted);
        assert!(filter.check("abcde").unwrap().accepted);
        assert!(!filter.check("abcdef").unwrap().accepted);
    }

    #[test]
    fn test_normal_mode_never_changes_text() {
        let filter = LengthFilter::default();
        let text = "Perfectly green apples.".repeat(10);
        let verdict = filter.check(&text).unwrap();
        assert!(!verdict.accepted);
        assert_eq!(verdict.text, text.as_str());
        assert!(filter.check("Perfectly green apples.").unwrap().accepted);
    }

    #[test]
    fn test_crop_truncates_long_text() {
        let filter = LengthFilter::new(10, 15, LengthMode::Crop).unwrap();
        let text = "This is a test string - technically too long.";
        let verdict = filter.check(text).unwrap();
        assert!(verdict.accepted);
        assert_eq!(verdict.text, "This is a test ");
    }

    #[test]
    fn test_crop_pads_short_text() {
        let filter = LengthFilter::new(6, 10, LengthMode::Crop)
            .unwrap()
            .with_padding('.');
        let verdict = filter.check("Hi").unwrap();
        assert!(verdict.accepted);
        assert_eq!(verdict.text, "Hi....");
    }

    #[test]
    fn test_crop_counts_characters_not_bytes() {
        let filter = LengthFilter::new(1, 3, LengthMode::Crop).unwrap();
        assert_eq!(filter.check("äöüß").unwrap().text, "äöü");
        assert_eq!(filter.check("äöü").unwrap().text, "äöü");
    }

    #[test]
    fn test_empty_input() {
        let filter = LengthFilter::new(0, 5, LengthMode::Normal).unwrap();
        assert!(filter.check("").unwrap().accepted);
        let filter = LengthFilter::new(2, 5, LengthMode::Crop).unwrap();
        assert_eq!(filter.check("").unwrap().text, "  ");
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(LengthFilter::new(10, 5, LengthMode::Normal).is_err());
        let filter = LengthFilter::default();
        assert!(filter.clone().with_padding_str("--").is_err());
        assert!(filter.clone().with_padding_str("").is_err());
        assert!(filter.with_padding_str("-").is_ok());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("crop".parse::<LengthMode>().unwrap(), LengthMode::Crop);
        assert!("censor".parse::<LengthMode>().is_err());
    }
}
