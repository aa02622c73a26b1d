//! Advisory callbacks for resolution anomalies.
//!
//! The engine reports the oddities it recovers from (unmatched tokens,
//! skipped parent levels, ambiguous results) through an [`ErrorHandler`]
//! rather than through its return value: resolution is lossy, not
//! fallible. At most one of `token_not_found`, `skipping_parent_level`,
//! `type_not_found`, and `ambiguous` fires per resolve call (the first
//! wins); `place_not_found` fires independently whenever resolution
//! comes up empty on input that had real words.

use tracing::debug;

use crate::place::{Place, PlaceId};

/// Receiver for resolution anomalies. All methods default to no-ops so
/// implementations override only what they observe. Implementations
/// must not panic; the engine treats every callback as advisory.
#[allow(unused_variables)]
pub trait ErrorHandler: Send + Sync {
    /// A level's words produced no word-index hit, or its hits had no
    /// ancestor among the running candidates. `candidate_ids` is the
    /// running candidate set with child places removed.
    fn token_not_found(
        &self,
        text: &str,
        level_words: &[Vec<String>],
        level: usize,
        candidate_ids: &[PlaceId],
    ) {
    }

    /// A level attached to a grandparent (or fresh) candidate set
    /// because the running candidates had no matching children.
    fn skipping_parent_level(
        &self,
        text: &str,
        level_words: &[Vec<String>],
        level: usize,
        candidate_ids: &[PlaceId],
    ) {
    }

    /// The trailing type token matched none of the candidates.
    fn type_not_found(
        &self,
        text: &str,
        level_words: &[Vec<String>],
        level: usize,
        candidate_ids: &[PlaceId],
    ) {
    }

    /// Multiple candidates survived; `chosen` is the highest-scoring.
    fn ambiguous(
        &self,
        text: &str,
        level_words: &[Vec<String>],
        candidate_ids: &[PlaceId],
        chosen: &Place,
    ) {
    }

    /// No level of the input matched anything.
    fn place_not_found(&self, text: &str, level_words: &[Vec<String>]) {}
}

/// Logs every anomaly at debug level through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn token_not_found(
        &self,
        text: &str,
        _level_words: &[Vec<String>],
        level: usize,
        candidate_ids: &[PlaceId],
    ) {
        debug!(text, level, ?candidate_ids, "token not found");
    }

    fn skipping_parent_level(
        &self,
        text: &str,
        _level_words: &[Vec<String>],
        level: usize,
        candidate_ids: &[PlaceId],
    ) {
        debug!(text, level, ?candidate_ids, "skipping parent level");
    }

    fn type_not_found(
        &self,
        text: &str,
        _level_words: &[Vec<String>],
        level: usize,
        candidate_ids: &[PlaceId],
    ) {
        debug!(text, level, ?candidate_ids, "type not found");
    }

    fn ambiguous(
        &self,
        text: &str,
        _level_words: &[Vec<String>],
        candidate_ids: &[PlaceId],
        chosen: &Place,
    ) {
        debug!(text, ?candidate_ids, chosen = %chosen, "ambiguous place");
    }

    fn place_not_found(&self, text: &str, _level_words: &[Vec<String>]) {
        debug!(text, "place not found");
    }
}
