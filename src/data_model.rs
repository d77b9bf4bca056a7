use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::executor::Filter;

/// What a single filter says about a piece of text.
///
/// `text` borrows the input when the filter leaves it alone, so that an
/// untouched string costs nothing and compares equal to what was passed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict<'a> {
    pub accepted: bool,
    pub text: Cow<'a, str>,
}

impl<'a> Verdict<'a> {
    pub fn new(accepted: bool, text: impl Into<Cow<'a, str>>) -> Self {
        Verdict {
            accepted,
            text: text.into(),
        }
    }

    /// Accept the text unchanged.
    pub fn pass(text: &'a str) -> Self {
        Verdict::new(true, text)
    }

    /// Reject the text unchanged.
    pub fn reject(text: &'a str) -> Self {
        Verdict::new(false, text)
    }

    pub fn into_parts(self) -> (bool, String) {
        (self.accepted, self.text.into_owned())
    }
}

/// Outcome of running one string through a [`Pipeline`](crate::executor::Pipeline).
///
/// `failed_filters` borrows the filters owned by the pipeline that produced
/// this result, in the order they reported a failure.
pub struct CheckResult<'p> {
    pub passed: bool,
    pub result: String,
    pub original: String,
    pub changes_made: usize,
    pub failed_filters: Vec<&'p dyn Filter>,
}

impl<'p> CheckResult<'p> {
    /// Names of the failed filters, in failure order.
    pub fn failed_filter_names(&self) -> Vec<&'static str> {
        self.failed_filters.iter().map(|f| f.name()).collect()
    }

    /// Whether this exact filter instance reported a failure.
    pub fn has_failed(&self, filter: &dyn Filter) -> bool {
        self.failed_filters
            .iter()
            .any(|f| std::ptr::addr_eq(*f as *const _, filter as *const _))
    }

    /// Whether any failed filter carries the given name.
    pub fn has_failed_named(&self, name: &str) -> bool {
        self.failed_filters.iter().any(|f| f.name() == name)
    }

    pub fn to_report(&self) -> CheckReport {
        CheckReport {
            passed: self.passed,
            result: self.result.clone(),
            original: self.original.clone(),
            changes_made: self.changes_made,
            failed_filters: self
                .failed_filter_names()
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl fmt::Debug for CheckResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckResult")
            .field("passed", &self.passed)
            .field("result", &self.result)
            .field("original", &self.original)
            .field("changes_made", &self.changes_made)
            .field("failed_filters", &self.failed_filter_names())
            .finish()
    }
}

/// Owned, serializable summary of a [`CheckResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub passed: bool,
    pub result: String,
    pub original: String,
    pub changes_made: usize,
    pub failed_filters: Vec<String>,
}
