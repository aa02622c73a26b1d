//! Building lookup tokens from one level's words.
//!
//! Words are consumed right to left. Trailing type words accumulate
//! into the type token; everything from the first non-type word
//! leftward concatenates into the name token with no separators, so
//! `["st", "louis", "cemetery"]` yields name `"stlouis"` and type
//! `"cemetery"`. A level of nothing but type words keeps them all as
//! the name token.

use itertools::Itertools;

use crate::config::StandardizerConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LevelTokens {
    pub name: Option<String>,
    pub type_token: Option<String>,
}

/// Build the `(name, type)` token pair from `words[words_to_skip..]`.
///
/// Rules, right to left:
/// - `"now"` halts unconditionally; `"or"` halts only once the buffer
///   has content and the word is past the skip boundary. Whatever lies
///   to the left is a parenthetical rename and is dropped.
/// - Abbreviations expand only when the level holds more than one word
///   after skipping (a lone `"no"` must stay `"no"`, not `"north"`).
pub(crate) fn build_level_tokens(
    words: &[String],
    words_to_skip: usize,
    config: &StandardizerConfig,
) -> LevelTokens {
    let mut tokens = LevelTokens::default();
    let mut buf = String::new();
    let mut found_name_word = false;

    for i in (words_to_skip..words.len()).rev() {
        let mut word = words[i].as_str();
        if word.is_empty() {
            continue;
        }
        if (i > words_to_skip && !buf.is_empty() && word == "or") || word == "now" {
            break;
        }
        if words.len() - words_to_skip > 1 {
            if let Some(expansion) = config.abbreviations.get(word) {
                word = expansion;
            }
        }
        if !config.type_words.contains(word) {
            // type words seen so far were trailing; they become the type token
            if !found_name_word && !buf.is_empty() {
                tokens.type_token = Some(std::mem::take(&mut buf));
            }
            found_name_word = true;
        }
        buf.insert_str(0, word);
    }

    if !buf.is_empty() {
        tokens.name = Some(buf);
    }
    tokens
}

/// Human-readable name for a synthetic place, from one level's words.
/// Trailing type words are dropped, except `"cemetery"`, which stays
/// part of the name; a level of only type words keeps every word. Words
/// are title-cased and joined with single spaces.
pub(crate) fn generate_place_name(words: &[String], config: &StandardizerConfig) -> String {
    let mut end = words.len();
    while end > 0 && config.is_type_word(&words[end - 1]) && words[end - 1] != "cemetery" {
        end -= 1;
    }
    if end == 0 {
        end = words.len();
    }

    words[..end]
        .iter()
        .map(|word| {
            let mut titled = String::with_capacity(word.len());
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                titled.extend(first.to_uppercase());
                titled.extend(chars.flat_map(char::to_lowercase));
            }
            titled
        })
        .join(" ")
}
