use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::data_model::Verdict;
use crate::error::Result;
use crate::executor::Filter;

use super::mode::filter_mode;

filter_mode! {
    pub enum RegexMode for "Regex" {
        /// Reject text containing a match.
        #[default]
        Normal => "normal",
        /// Replace every match and accept.
        Censor => "censor",
    }
}

pub const EMAIL_PATTERN: &str = r"([a-zA-Z0-9+._-]+@[a-zA-Z0-9._-]+\.[a-zA-Z0-9_-]+)";

pub const DEFAULT_REPLACEMENT: &str = "***";

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("e-mail pattern is a valid regex"));

/// Checks text against a regular expression.
///
/// The replacement may refer to capture groups (`$1`, `${name}`).
#[derive(Debug, Clone)]
pub struct RegexFilter {
    regex: Regex,
    mode: RegexMode,
    replacement: String,
}

impl RegexFilter {
    pub fn new(expression: &str, mode: RegexMode) -> Result<Self> {
        Self::builder(expression).mode(mode).build()
    }

    pub fn builder(expression: &str) -> RegexFilterBuilder {
        RegexFilterBuilder {
            expression: expression.to_string(),
            mode: RegexMode::Normal,
            replacement: DEFAULT_REPLACEMENT.to_string(),
            case_insensitive: false,
            multiline: false,
        }
    }

    /// Filter for e-mail addresses.
    pub fn email(mode: RegexMode) -> Self {
        RegexFilter {
            regex: EMAIL_REGEX.clone(),
            mode,
            replacement: DEFAULT_REPLACEMENT.to_string(),
        }
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    pub fn expression(&self) -> &str {
        self.regex.as_str()
    }

    pub fn mode(&self) -> RegexMode {
        self.mode
    }
}

impl Filter for RegexFilter {
    fn name(&self) -> &'static str {
        "RegexFilter"
    }

    fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>> {
        Ok(match self.mode {
            RegexMode::Normal => Verdict::new(!self.regex.is_match(text), text),
            RegexMode::Censor => Verdict::new(
                true,
                self.regex.replace_all(text, self.replacement.as_str()),
            ),
        })
    }
}

/// Builder for a [`RegexFilter`] with non-default flags or replacement.
#[derive(Debug, Clone)]
pub struct RegexFilterBuilder {
    expression: String,
    mode: RegexMode,
    replacement: String,
    case_insensitive: bool,
    multiline: bool,
}

impl RegexFilterBuilder {
    pub fn mode(mut self, mode: RegexMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    pub fn multiline(mut self, yes: bool) -> Self {
        self.multiline = yes;
        self
    }

    /// Compiles the expression. Fails with a `RegexError` if it is invalid.
    pub fn build(self) -> Result<RegexFilter> {
        let regex = RegexBuilder::new(&self.expression)
            .case_insensitive(self.case_insensitive)
            .multi_line(self.multiline)
            .build()?;
        Ok(RegexFilter {
            regex,
            mode: self.mode,
            replacement: self.replacement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn test_email_normal_mode() {
        let filter = RegexFilter::email(RegexMode::Normal);
        assert!(
            !filter
                .check("Hey there! My email is john.doe@subdomain.example.com.")
                .unwrap()
                .accepted
        );
        assert!(filter.check("No contact details here.").unwrap().accepted);
    }

    #[test]
    fn test_email_censor_mode() {
        let filter = RegexFilter::email(RegexMode::Censor);
        let verdict = filter
            .check("Hey there! My email is john.doe@subdomain.example.com.")
            .unwrap();
        assert!(verdict.accepted);
        assert_eq!(verdict.text, "Hey there! My email is ***.");
    }

    #[test]
    fn test_censor_without_match_leaves_text() {
        let filter = RegexFilter::new(r"\d{3}-\d{4}", RegexMode::Censor).unwrap();
        let verdict = filter.check("Call me maybe").unwrap();
        assert!(verdict.accepted);
        assert_eq!(verdict.text, "Call me maybe");
        assert_eq!(filter.check("Call 555-1234").unwrap().text, "Call ***");
    }

    #[test]
    fn test_builder_flags_and_replacement() {
        let filter = RegexFilter::builder("secret")
            .mode(RegexMode::Censor)
            .case_insensitive(true)
            .replacement("[redacted]")
            .build()
            .unwrap();
        assert_eq!(
            filter.check("The SECRET is out").unwrap().text,
            "The [redacted] is out"
        );
    }

    #[test]
    fn test_invalid_expression() {
        match RegexFilter::new("(unclosed", RegexMode::Normal) {
            Err(PipelineError::RegexError { .. }) => {}
            other => panic!("Expected RegexError, got {:?}", other),
        }
    }
}
