//! Text normalization for gazetteer lookups.
//!
//! User input and gazetteer names are folded to a common form before
//! any comparison: transliterated to ASCII, lowercased, and stripped of
//! punctuation. [`Normalizer::tokenize`] splits input text into
//! comma-separated levels of word lists; [`Normalizer::normalize`]
//! produces the contiguous alphanumeric form used for substring checks
//! against concatenated name tokens (so `"St. Louis"` normalizes to
//! `"stlouis"` and matches the token built from `["st", "louis"]`).

use deunicode::deunicode;

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Split `text` into levels on commas, and each level into
    /// normalized words. Levels with no usable words come back empty
    /// rather than being dropped, so level indices still line up with
    /// the commas in the input.
    pub fn tokenize(&self, text: &str) -> Vec<Vec<String>> {
        text.split(',').map(|level| self.words(level)).collect()
    }

    /// Normalized words of a single level.
    pub fn words(&self, level: &str) -> Vec<String> {
        deunicode(level)
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Collapse `text` to its contiguous alphanumeric form:
    /// transliterated, lowercased, all other characters removed.
    pub fn normalize(&self, text: &str) -> String {
        deunicode(text)
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect()
    }
}
