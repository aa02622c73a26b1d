//! Candidate scoring.
//!
//! A candidate's base score is a level weight chosen by how large its
//! country is: big countries (many fine-grained entries) favor deep
//! matches differently than small ones. When the name token occurs
//! inside the normalized primary name, the primary-match bonus is
//! added on top.

use crate::config::StandardizerConfig;
use crate::normalize::Normalizer;
use crate::place::{MAX_LEVELS, Place};

pub(crate) fn score_match(
    config: &StandardizerConfig,
    normalizer: &Normalizer,
    name_token: &str,
    place: &Place,
) -> f64 {
    let weights = if config.large_countries.contains(&place.country_id) {
        &config.large_country_level_weights
    } else if config.medium_countries.contains(&place.country_id) {
        &config.medium_country_level_weights
    } else {
        &config.small_country_level_weights
    };

    let level = (place.level as usize).clamp(1, MAX_LEVELS);
    let mut score = weights[level - 1];

    if !name_token.is_empty() && normalizer.normalize(&place.name).contains(name_token) {
        score += config.primary_match_weight;
    }
    score
}
