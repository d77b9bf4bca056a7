use crate::data_model::Verdict;
use crate::error::{PipelineError, Result};
use crate::executor::Filter;
use crate::utils::text::{is_letter, ratio};

/// Detects text written to slip past other filters, such as
/// "a  v e r y   b a d   w o r d" or "b_y_p_a_s_s".
///
/// Counts letters that sit alone between two non-letters. The text is
/// rejected when the share of such letters exceeds `percentage`, or when
/// their number reaches `max_findings` (0 disables the absolute limit).
#[derive(Debug, Clone)]
pub struct BypassDetector {
    percentage: f64,
    max_findings: usize,
}

impl BypassDetector {
    pub fn new(percentage: f64, max_findings: usize) -> Result<Self> {
        if !(0.0..=1.0).contains(&percentage) {
            return Err(PipelineError::ConfigValidationError(format!(
                "BypassDetector: percentage must be between 0.0 and 1.0, got {}",
                percentage
            )));
        }
        Ok(BypassDetector {
            percentage,
            max_findings,
        })
    }

    /// Returns `(isolated letters, letters)`.
    fn count_isolated_letters(text: &str) -> (usize, usize) {
        let chars: Vec<char> = text.chars().collect();
        let mut isolated = 0;
        let mut letters = 0;

        for (idx, &c) in chars.iter().enumerate() {
            if !is_letter(c) {
                continue;
            }
            letters += 1;

            let alone_left = idx > 0 && !is_letter(chars[idx - 1]);
            let alone_right = idx + 1 < chars.len() && !is_letter(chars[idx + 1]);
            if alone_left && alone_right {
                isolated += 1;
            }
        }

        (isolated, letters)
    }
}

impl Default for BypassDetector {
    fn default() -> Self {
        BypassDetector {
            percentage: 0.4,
            max_findings: 5,
        }
    }
}

impl Filter for BypassDetector {
    fn name(&self) -> &'static str {
        "BypassDetector"
    }

    fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>> {
        let (isolated, letters) = Self::count_isolated_letters(text);

        let passed = ratio(isolated, letters) <= self.percentage
            && (self.max_findings == 0 || isolated < self.max_findings);

        Ok(Verdict::new(passed, text))
    }
}
