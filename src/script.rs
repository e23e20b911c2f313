//! Script tokenization and the immutable word index.
//!
//! A `Script` is built once from the raw script text and never mutated afterward. Every
//! downstream component (matching, tracking, highlighting) refers to words by index into
//! this structure, so byte offsets are captured at build time and candidates can be mapped
//! straight to highlight ranges without re-scanning the text.

use serde::Serialize;

use crate::error::{Error, Result};

/// A single word of the script, with its normalized form and byte offsets into the
/// original text.
#[derive(Debug, Serialize, Clone)]
pub struct Word {
    /// The word exactly as it appears in the script.
    pub text: String,

    /// Lowercased form with surrounding punctuation stripped; the form used for matching.
    pub normalized: String,

    /// Byte offset of the first character of `text` in the original script.
    pub char_start: usize,

    /// Byte offset one past the last character of `text` in the original script.
    pub char_end: usize,

    /// Position of this word in the script, starting at 0.
    pub index: usize,
}

/// An immutable, tokenized script.
///
/// Built once per session (or per `load_script` call) and shared read-only afterward.
#[derive(Debug, Serialize, Clone)]
pub struct Script {
    text: String,
    words: Vec<Word>,
}

impl Script {
    /// Tokenize `text` into an indexed word sequence.
    ///
    /// Words are whitespace-separated runs. Tokens that normalize to nothing (pure
    /// punctuation) are kept in the sequence so word indices line up with what the viewer
    /// sees, but they never match spoken tokens.
    ///
    /// Fails when the script contains no words at all: a session cannot follow an empty
    /// script, and catching that here keeps the invariant `confirmed_position < len()`
    /// trivially true everywhere else.
    pub fn build(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let mut words = Vec::new();

        let mut offset = 0usize;
        for chunk in text.split_whitespace() {
            // `split_whitespace` drops offsets, so recover them by searching forward from
            // the end of the previous token. Chunks are yielded in order, so this never
            // rescans earlier text.
            let start = match text[offset..].find(chunk) {
                Some(pos) => offset + pos,
                None => continue,
            };
            let end = start + chunk.len();

            let index = words.len();
            words.push(Word {
                text: chunk.to_string(),
                normalized: normalize_word(chunk),
                char_start: start,
                char_end: end,
                index,
            });
            offset = end;
        }

        if words.iter().all(|w| w.normalized.is_empty()) {
            return Err(Error::msg("script contains no matchable words"));
        }

        Ok(Self { text, words })
    }

    /// The original script text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All words in script order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Word> {
        self.words.get(index)
    }

    /// Clamp an arbitrary position hint into valid word bounds.
    pub fn clamp_index(&self, index: isize) -> usize {
        if index <= 0 {
            return 0;
        }
        (index as usize).min(self.words.len().saturating_sub(1))
    }

    /// Byte range covering words `start..=end`, for highlight rendering.
    ///
    /// Indices are clamped into bounds; a reversed pair yields the range of `start` alone.
    pub fn char_range(&self, start: usize, end: usize) -> (usize, usize) {
        if self.words.is_empty() {
            return (0, 0);
        }
        let last = self.words.len() - 1;
        let start = start.min(last);
        let end = end.min(last).max(start);
        (self.words[start].char_start, self.words[end].char_end)
    }
}

/// Normalize a token for matching: strip non-alphanumeric edges, lowercase the rest.
///
/// Interior punctuation (apostrophes, hyphens) is kept so "don't" and "dont" stay close in
/// edit distance rather than identical, which is what the similarity threshold expects.
pub fn normalize_word(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Tokenize a spoken fragment with the same normalizer as the script.
///
/// Empty normalizations are dropped here (unlike script words) because spoken punctuation
/// carries no position information.
pub fn tokenize_fragment(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(normalize_word)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_words_with_offsets() {
        let script = Script::build("Four score and seven").unwrap();
        assert_eq!(script.len(), 4);

        let seven = script.get(3).unwrap();
        assert_eq!(seven.text, "seven");
        assert_eq!(seven.normalized, "seven");
        assert_eq!(&script.text()[seven.char_start..seven.char_end], "seven");
        assert_eq!(seven.index, 3);
    }

    #[test]
    fn normalizes_case_and_punctuation() {
        let script = Script::build("  Hello, world!  \n \"Quoted.\" ").unwrap();
        let normals: Vec<&str> = script
            .words()
            .iter()
            .map(|w| w.normalized.as_str())
            .collect();
        assert_eq!(normals, vec!["hello", "world", "quoted"]);
    }

    #[test]
    fn keeps_interior_apostrophes() {
        assert_eq!(normalize_word("Don't!"), "don't");
    }

    #[test]
    fn empty_script_is_an_error() {
        assert!(Script::build("").is_err());
        assert!(Script::build("... --- !!!").is_err());
    }

    #[test]
    fn clamp_index_stays_in_bounds() {
        let script = Script::build("one two three").unwrap();
        assert_eq!(script.clamp_index(-5), 0);
        assert_eq!(script.clamp_index(1), 1);
        assert_eq!(script.clamp_index(99), 2);
    }

    #[test]
    fn char_range_maps_word_span() {
        let text = "Four score and seven years";
        let script = Script::build(text).unwrap();
        let (start, end) = script.char_range(1, 3);
        assert_eq!(&text[start..end], "score and seven");

        // Out-of-bounds indices clamp rather than panic.
        let (start, end) = script.char_range(4, 100);
        assert_eq!(&text[start..end], "years");
    }

    #[test]
    fn fragment_tokenizer_drops_empty_tokens() {
        let tokens = tokenize_fragment("  Uh, — seven YEARS ago! ");
        assert_eq!(tokens, vec!["uh", "seven", "years", "ago"]);
    }
}
