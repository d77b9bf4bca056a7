use crate::data_model::{CheckResult, Verdict};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// A single moderation rule.
///
/// `check` is given the current text and returns whether the filter accepts
/// it, together with the (possibly rewritten) text. When a filter makes no
/// change it must hand the input back unchanged: the pipeline treats any
/// difference between input and output as a mutation.
///
/// Configuration problems belong in the constructor. An `Err` from `check` is
/// reserved for filters backed by an external service that failed to answer.
pub trait Filter: Send + Sync {
    fn name(&self) -> &'static str; // For logging/error reporting

    fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>>;
}

/// How the results of the individual filters are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineMode {
    /// Apply changes, fail when any filter fails.
    #[default]
    Normal,
    /// Like `Normal`, but stop at the first failure.
    NormalQuick,
    /// Apply changes and always pass. Failures are still recorded.
    Tolerant,
    /// Any failure or any change disqualifies the text and stops execution.
    ZeroTolerance,
}

impl PipelineMode {
    pub const ALL: [PipelineMode; 4] = [
        PipelineMode::Normal,
        PipelineMode::NormalQuick,
        PipelineMode::Tolerant,
        PipelineMode::ZeroTolerance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineMode::Normal => "normal",
            PipelineMode::NormalQuick => "normal-quick",
            PipelineMode::Tolerant => "tolerant",
            PipelineMode::ZeroTolerance => "zero-tolerance",
        }
    }

    fn stops_on_failure(&self) -> bool {
        matches!(self, PipelineMode::NormalQuick | PipelineMode::ZeroTolerance)
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        PipelineMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| PipelineError::UnknownMode {
                kind: "pipeline",
                value: s.to_string(),
                expected: PipelineMode::ALL.map(|m| m.as_str()).join(", "),
            })
    }
}

/// An ordered list of filters plus the mode that combines their verdicts.
///
/// Filters run strictly in insertion order; later filters see the text as
/// rewritten by earlier ones.
#[derive(Clone, Default)]
pub struct Pipeline {
    filters: Vec<Arc<dyn Filter>>, // Holds the ordered filters
    mode: PipelineMode,
}

impl Pipeline {
    pub fn new(filters: Vec<Arc<dyn Filter>>, mode: PipelineMode) -> Self {
        if filters.is_empty() {
            warn!("Pipeline created with no filters.");
        }
        Pipeline { filters, mode }
    }

    /// Like [`Pipeline::new`], with the mode given by name
    /// (`normal`, `normal-quick`, `tolerant` or `zero-tolerance`).
    pub fn with_mode_str(filters: Vec<Arc<dyn Filter>>, mode: &str) -> Result<Self> {
        Ok(Pipeline::new(filters, mode.parse()?))
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PipelineMode) {
        self.mode = mode;
    }

    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Appends a filter; it runs after every filter already present.
    pub fn push(&mut self, filter: Arc<dyn Filter>) {
        self.filters.push(filter);
    }

    /// Inserts a filter at `index`. Panics if `index > len`, like `Vec::insert`.
    pub fn insert(&mut self, index: usize, filter: Arc<dyn Filter>) {
        self.filters.insert(index, filter);
    }

    /// Removes and returns the filter at `index`, if there is one.
    pub fn remove(&mut self, index: usize) -> Option<Arc<dyn Filter>> {
        if index < self.filters.len() {
            Some(self.filters.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Runs `text` through the filters and combines their verdicts according
    /// to the pipeline mode.
    ///
    /// A filter returning an error aborts the check; the error is wrapped in
    /// [`PipelineError::FilterError`] and no partial result is produced.
    ///
    /// The returned [`CheckResult`] borrows the pipeline (its failed filters
    /// point into it), so the pipeline must outlive the result.
    #[instrument(skip_all, fields(mode = %self.mode, filters = self.filters.len()))]
    pub fn check(&self, text: &str) -> Result<CheckResult<'_>> {
        let mut current = text.to_string();
        let mut passed = true;
        let mut changes_made = 0;
        let mut failed_filters: Vec<&dyn Filter> = Vec::new();

        for filter in &self.filters {
            trace!(filter = filter.name(), "Running filter");

            let verdict = filter
                .check(&current)
                .map_err(|e| PipelineError::FilterError {
                    filter_name: filter.name().to_string(),
                    source: Box::new(e),
                })?;

            let accepted = verdict.accepted;
            let rewritten = if verdict.text != current.as_str() {
                Some(verdict.text.into_owned())
            } else {
                None
            };

            if !accepted {
                failed_filters.push(&**filter);
            }

            if let Some(new_text) = rewritten {
                if self.mode == PipelineMode::ZeroTolerance {
                    debug!(filter = filter.name(), "Change rejected in zero-tolerance mode");
                    passed = false;
                    break;
                }
                debug!(filter = filter.name(), "Filter changed the text");
                changes_made += 1;
                current = new_text;
            }

            if passed && !accepted {
                debug!(filter = filter.name(), "First failing filter");
                passed = false;
                if self.mode.stops_on_failure() {
                    break;
                }
            }
        }

        if self.mode == PipelineMode::Tolerant {
            passed = true;
        }

        Ok(CheckResult {
            passed,
            result: current,
            original: text.to_string(),
            changes_made,
            failed_filters,
        })
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("mode", &self.mode)
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Uppercase;

    impl Filter for Uppercase {
        fn name(&self) -> &'static str {
            "Uppercase"
        }

        fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>> {
            Ok(Verdict::new(true, text.to_uppercase()))
        }
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("normal".parse::<PipelineMode>().unwrap(), PipelineMode::Normal);
        assert_eq!(
            "normal-quick".parse::<PipelineMode>().unwrap(),
            PipelineMode::NormalQuick
        );
        assert_eq!(
            "zero-tolerance".parse::<PipelineMode>().unwrap(),
            PipelineMode::ZeroTolerance
        );
        match "strict".parse::<PipelineMode>() {
            Err(PipelineError::UnknownMode { value, expected, .. }) => {
                assert_eq!(value, "strict");
                assert!(expected.contains("tolerant"));
            }
            other => panic!("Expected UnknownMode, got {:?}", other),
        }
    }

    #[test]
    fn test_with_mode_str_rejects_unknown_mode() {
        assert!(Pipeline::with_mode_str(vec![], "lenient").is_err());
        let pipeline = Pipeline::with_mode_str(vec![], "tolerant").unwrap();
        assert_eq!(pipeline.mode(), PipelineMode::Tolerant);
    }

    #[test]
    fn test_unchanged_text_is_not_a_change() {
        let pipeline = Pipeline::new(vec![Arc::new(Uppercase)], PipelineMode::Normal);

        let result = pipeline.check("ALREADY LOUD").unwrap();
        assert_eq!(result.changes_made, 0);

        let result = pipeline.check("quiet").unwrap();
        assert_eq!(result.changes_made, 1);
        assert_eq!(result.result, "QUIET");
        assert_eq!(result.original, "quiet");
    }

    #[test]
    fn test_push_insert_remove_keep_order() {
        let mut pipeline = Pipeline::default();
        assert!(pipeline.is_empty());

        let first: Arc<dyn Filter> = Arc::new(Uppercase);
        pipeline.push(Arc::clone(&first));
        pipeline.insert(0, Arc::new(Uppercase));
        assert_eq!(pipeline.len(), 2);
        assert!(Arc::ptr_eq(&pipeline.filters()[1], &first));

        let removed = pipeline.remove(1).unwrap();
        assert!(Arc::ptr_eq(&removed, &first));
        assert!(pipeline.remove(5).is_none());
        assert_eq!(pipeline.len(), 1);
    }
}
