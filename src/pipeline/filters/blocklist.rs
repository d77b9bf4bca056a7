use itertools::Itertools;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

use crate::data_model::Verdict;
use crate::error::Result;
use crate::executor::Filter;
use crate::utils::text::{split_keep_empty, BLOCKLIST_DELIMITERS};

use super::mode::filter_mode;

filter_mode! {
    /// How [`BlocklistFilter`] looks for and handles blocked terms.
    pub enum BlocklistMode for "Blocklist" {
        /// Reject when a token between punctuation or spaces is blocked.
        #[default]
        Normal => "normal",
        /// Reject when a blocked term occurs anywhere, even inside a longer
        /// word ("class" in "classic").
        Strict => "strict",
        /// Replace blocked tokens and accept.
        Tolerant => "tolerant",
    }
}

/// What tolerant mode puts in place of a blocked term.
pub const PROFANITY_REPLACEMENT: &str = "#@!";

/// Checks text against a set of blocked terms.
///
/// Works best placed after a [`BypassDetector`](super::BypassDetector), which
/// catches spaced-out terms that would never match a token.
#[derive(Debug, Clone)]
pub struct BlocklistFilter {
    blocklist: HashSet<String>,
    mode: BlocklistMode,
}

impl BlocklistFilter {
    pub fn new<I, S>(blocklist: I, mode: BlocklistMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let blocklist: HashSet<String> = blocklist
            .into_iter()
            .map(Into::into)
            .filter(|term: &String| !term.is_empty())
            .collect();
        if blocklist.is_empty() {
            warn!("BlocklistFilter created with an empty blocklist. It will never reject.");
        }
        BlocklistFilter { blocklist, mode }
    }

    /// Loads the blocklist from a JSON file holding an array of strings.
    pub fn from_json_file(path: impl AsRef<Path>, mode: BlocklistMode) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let terms: Vec<String> = serde_json::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), terms = terms.len(), "Loaded blocklist");
        Ok(Self::new(terms, mode))
    }

    pub fn mode(&self) -> BlocklistMode {
        self.mode
    }

    /// The blocked terms, in no particular order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.blocklist.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocklist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocklist.is_empty()
    }

    fn find_terms<'t>(&'t self, text: &'t str) -> HashSet<&'t str> {
        match self.mode {
            BlocklistMode::Strict => self
                .blocklist
                .iter()
                .filter(|term| text.contains(term.as_str()))
                .map(String::as_str)
                .collect(),
            BlocklistMode::Normal | BlocklistMode::Tolerant => {
                split_keep_empty(text, BLOCKLIST_DELIMITERS)
                    .filter(|token| self.blocklist.contains(*token))
                    .collect()
            }
        }
    }
}

impl Filter for BlocklistFilter {
    fn name(&self) -> &'static str {
        "BlocklistFilter"
    }

    fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>> {
        let found = self.find_terms(text);
        if found.is_empty() {
            return Ok(Verdict::pass(text));
        }

        match self.mode {
            BlocklistMode::Normal | BlocklistMode::Strict => Ok(Verdict::reject(text)),
            BlocklistMode::Tolerant => {
                // Longest terms first, so a term never eats part of a longer one.
                let censored = found
                    .into_iter()
                    .sorted_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)))
                    .fold(text.to_string(), |acc, term| {
                        acc.replace(term, PROFANITY_REPLACEMENT)
                    });
                Ok(Verdict::new(true, censored))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn words() -> Vec<&'static str> {
        vec!["badword", "pancake"]
    }

    #[test]
    fn test_normal_mode() {
        let filter = BlocklistFilter::new(words(), BlocklistMode::Normal);
        assert!(!filter.check("This contains a badword.").unwrap().accepted);
        assert!(!filter.check("(pancake)").unwrap().accepted);
        assert!(!filter.check("what?pancake!").unwrap().accepted);
        assert!(filter.check("This is clean.").unwrap().accepted);
        // Not split on commas, and not a substring search.
        assert!(filter.check("pancake, please").unwrap().accepted);
        assert!(filter.check("pancakes").unwrap().accepted);
    }

    #[test]
    fn test_strict_mode_matches_substrings() {
        let filter = BlocklistFilter::new(words(), BlocklistMode::Strict);
        assert!(!filter.check("ppancakee").unwrap().accepted);
        assert!(filter.check("ppanccakee").unwrap().accepted);
    }

    #[test]
    fn test_token_and_strict_mode_on_embedded_term() {
        let text = "This is a badword.";
        let verdict = BlocklistFilter::new(["badword"], BlocklistMode::Normal)
            .check(text)
            .unwrap();
        assert!(!verdict.accepted);
        assert_eq!(verdict.text, text);

        let text = "This is a ppancakee.";
        let verdict = BlocklistFilter::new(["pancake"], BlocklistMode::Normal)
            .check(text)
            .unwrap();
        assert!(verdict.accepted);
        assert_eq!(verdict.text, text);

        let verdict = BlocklistFilter::new(["pancake"], BlocklistMode::Strict)
            .check(text)
            .unwrap();
        assert!(!verdict.accepted);
        assert_eq!(verdict.text, text);
    }

    #[test]
    fn test_tolerant_mode_replaces() {
        let filter = BlocklistFilter::new(words(), BlocklistMode::Tolerant);
        let verdict = filter.check("I love pancake and badword!").unwrap();
        assert!(verdict.accepted);
        assert_eq!(verdict.text, "I love #@! and #@!!");

        let clean = "Nothing to see.";
        let verdict = filter.check(clean).unwrap();
        assert!(verdict.accepted);
        assert_eq!(verdict.text, clean);
    }

    #[test]
    fn test_empty_blocklist_never_rejects() {
        let filter = BlocklistFilter::new(Vec::<String>::new(), BlocklistMode::Strict);
        assert!(filter.is_empty());
        assert!(filter.check("anything goes").unwrap().accepted);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"["pancake", "waffle"]"#).unwrap();
        file.flush().unwrap();

        let filter = BlocklistFilter::from_json_file(file.path(), BlocklistMode::Normal).unwrap();
        assert_eq!(filter.len(), 2);
        assert!(!filter.check("one waffle").unwrap().accepted);
    }

    #[test]
    fn test_from_json_file_errors() {
        let result = BlocklistFilter::from_json_file("/non/existent/list.json", BlocklistMode::Normal);
        assert!(matches!(result, Err(crate::error::PipelineError::IoError { .. })));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"not": "a list"}}"#).unwrap();
        file.flush().unwrap();
        let result = BlocklistFilter::from_json_file(file.path(), BlocklistMode::Normal);
        assert!(matches!(
            result,
            Err(crate::error::PipelineError::SerializationError { .. })
        ));
    }
}
