// Text utils

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// ASCII punctuation plus the section sign, the explicit special-character class.
const SPECIAL_CHARS_LIT: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~§";

/// Characters the blocklist splits tokens on.
pub const BLOCKLIST_DELIMITERS: &[char] = &[
    ';', ':', '!', '?', '*', '[', '(', ')', '.', ' ', '|', '"', '\'', '$', '+',
];

/// Characters the word length filter splits words on.
pub const WORD_DELIMITERS: &[char] = &[',', ';', '.', ' ', ':', '-', '_', '!', '?', '(', ')'];

/// A lazily-initialized, global set of all explicit special characters
pub static SPECIAL_CHARS: Lazy<HashSet<char>> = Lazy::new(|| SPECIAL_CHARS_LIT.chars().collect());

/// Letters in the sense of the ratio-based filters: ASCII only.
pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Splits `text` on every delimiter, keeping empty pieces between adjacent
/// delimiters. An empty input yields a single empty piece.
pub fn split_keep_empty<'a>(text: &'a str, delimiters: &'a [char]) -> impl Iterator<Item = &'a str> {
    text.split(move |c: char| delimiters.contains(&c))
}

/// Ratio of `part` over `whole`, 0.0 when `whole` is zero.
pub fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_chars_cover_ascii_punctuation() {
        for c in (0u8..128).map(char::from).filter(|c| c.is_ascii_punctuation()) {
            assert!(SPECIAL_CHARS.contains(&c), "missing {:?}", c);
        }
        assert!(SPECIAL_CHARS.contains(&'§'));
        assert!(!SPECIAL_CHARS.contains(&'a'));
        assert!(!SPECIAL_CHARS.contains(&' '));
    }

    #[test]
    fn test_split_keep_empty() {
        let pieces: Vec<&str> = split_keep_empty("a..b", WORD_DELIMITERS).collect();
        assert_eq!(pieces, vec!["a", "", "b"]);

        let pieces: Vec<&str> = split_keep_empty("", WORD_DELIMITERS).collect();
        assert_eq!(pieces, vec![""]);
    }

    #[test]
    fn test_ratio_zero_whole() {
        assert_eq!(ratio(3, 0), 0.0);
        assert_eq!(ratio(1, 4), 0.25);
    }
}
