//! The resolution engine.
//!
//! Input levels are walked right to left (coarsest chunk first). Each
//! level's words are concatenated into a lookup token, skipping
//! left-hand words until the word index answers; skipped words are
//! re-inserted as a new level so commaless input like "St Louis Mo"
//! still parses. Hits are filtered to descendants of the running
//! candidate set, with a one-level backoff when users wrote a place
//! directly under its grandparent, and a trailing type token
//! disambiguates what remains. Anomalies along the way go to the
//! error handler; the walk itself never fails.

mod hierarchy;
mod score;
mod tokens;

use tracing::instrument;

use crate::config::StandardizerConfig;
use crate::events::ErrorHandler;
use crate::normalize::Normalizer;
use crate::place::{Mode, Place, PlaceId, PlaceScore};
use crate::store::{place_or_log, GazetteerStore};

use hierarchy::{filter_subplaces, is_skippable, remove_children};
pub(crate) use tokens::build_level_tokens;
use tokens::{generate_place_name, LevelTokens};

/// One resolution pass over a single input text. Borrows the engine's
/// read-only parts; owns nothing but its working lists.
pub(crate) struct Resolver<'a> {
    pub config: &'a StandardizerConfig,
    pub normalizer: &'a Normalizer,
    pub store: &'a dyn GazetteerStore,
    pub handler: Option<&'a dyn ErrorHandler>,
}

impl<'a> Resolver<'a> {
    #[instrument(name = "Resolve", level = "debug", skip(self), fields(mode = ?mode, num_results))]
    pub fn resolve(
        &self,
        text: &str,
        default_country: Option<&str>,
        mode: Mode,
        num_results: usize,
    ) -> Vec<PlaceScore> {
        let mut level_words = self.normalizer.tokenize(text);
        let mut current_ids: Option<Vec<PlaceId>> = None;
        let mut previous_ids: Option<Vec<PlaceId>> = None;
        let mut current_name_token: Option<String> = None;
        let mut last_found_level: Option<usize> = None;
        // only the first anomaly per call is reported; skipping words can
        // produce several, and the first describes the whole phrase
        let mut error_logged = false;

        let mut level = level_words.len();
        while level > 0 {
            level -= 1;
            let words = level_words[level].clone();

            // look up the level's token, skipping left-hand words until
            // the index answers
            let mut words_to_skip = 0;
            let mut found: Option<Vec<PlaceId>> = None;
            let mut tokens = LevelTokens::default();
            while words_to_skip < words.len() {
                tokens = build_level_tokens(&words, words_to_skip, self.config);
                if let Some(name) = tokens.name.as_deref() {
                    if let Some(ids) = self.store.ids_for_word(name) {
                        found = Some(ids);
                        break;
                    }
                }
                words_to_skip += 1;
            }

            // the skipped words become their own (finer) level so the
            // outer walk revisits them; noise and type words stay behind
            if found.is_some() && words_to_skip > 0 {
                let new_level: Vec<String> = words[..words_to_skip]
                    .iter()
                    .filter(|w| {
                        !self.config.noise_words.contains(w.as_str())
                            && !self.config.is_type_word(w)
                    })
                    .cloned()
                    .collect();
                if !new_level.is_empty() {
                    level_words.insert(level, new_level);
                    level += 1;
                }
            }

            let Some(mut ids) = found else {
                // nothing matched; log and move on
                if let Some(handler) = self.handler {
                    if !error_logged && self.contains_non_noise_words(&words) {
                        handler.token_not_found(
                            text,
                            &level_words,
                            level,
                            &self.minus_children(current_ids.as_deref()),
                        );
                        error_logged = true;
                    }
                }
                continue;
            };

            let mut ignore_type_token = false;
            if let Some(current) = current_ids.clone() {
                let mut matching = filter_subplaces(self.store, &ids, &current);

                // no children here: maybe the user skipped a level
                if matching.is_empty() && is_skippable(self.store, &current) {
                    if previous_ids.as_ref().is_some_and(|p| !p.is_empty()) {
                        let previous = previous_ids.clone().expect("checked non-empty");
                        matching = filter_subplaces(self.store, &ids, &previous);
                        if !matching.is_empty() {
                            current_ids = Some(previous);
                            if let Some(handler) = self.handler {
                                if !error_logged {
                                    handler.skipping_parent_level(
                                        text,
                                        &level_words,
                                        level,
                                        &remove_children(self.store, &matching),
                                    );
                                    error_logged = true;
                                }
                            }
                        }
                    } else if !is_skippable(self.store, &ids) {
                        // no grandparent to attach to, but this level
                        // matched something unskippable; go with it
                        matching = ids.clone();
                        current_ids = None;
                        if let Some(handler) = self.handler {
                            if !error_logged {
                                handler.skipping_parent_level(
                                    text,
                                    &level_words,
                                    level,
                                    &remove_children(self.store, &matching),
                                );
                                error_logged = true;
                            }
                        }
                    }
                }

                if matching.is_empty() {
                    // still nothing; pretend this level was never seen
                    ignore_type_token = true;
                    if let Some(handler) = self.handler {
                        if !error_logged && self.contains_non_noise_words(&words) {
                            handler.token_not_found(
                                text,
                                &level_words,
                                level,
                                &self.minus_children(current_ids.as_deref()),
                            );
                            error_logged = true;
                        }
                    }
                    ids = current_ids.take().unwrap_or_default();
                    current_ids = previous_ids.clone();
                } else {
                    last_found_level = Some(level);
                    ids = matching;
                }
            } else {
                last_found_level = Some(level);
            }

            // several candidates left: let the trailing type words decide
            if ids.len() > 1 && !ignore_type_token {
                if let Some(type_token) = tokens.type_token.as_deref() {
                    let matching = self.filter_types(type_token, &ids);
                    if matching.is_empty() {
                        if let Some(handler) = self.handler {
                            if !error_logged {
                                handler.type_not_found(
                                    text,
                                    &level_words,
                                    level,
                                    &remove_children(self.store, &ids),
                                );
                                error_logged = true;
                            }
                        }
                    } else {
                        ids = matching;
                    }
                }
            }

            previous_ids = current_ids;
            current_ids = Some(ids);
            current_name_token = tokens.name;
        }

        let mut results = self.build_results(
            text,
            &level_words,
            current_ids,
            current_name_token.as_deref(),
            default_country,
            mode,
            last_found_level,
            num_results,
            &mut error_logged,
        );

        // NEW mode: the finest levels never attached, so hand back a
        // synthetic place named after the next one, under the best match
        if !results.is_empty() && mode == Mode::New {
            if let Some(found) = last_found_level.filter(|&l| l > 0) {
                let place = Place {
                    name: generate_place_name(&level_words[found - 1], self.config),
                    located_in_id: results[0].place.id,
                    ..Place::default()
                };
                results.clear();
                results.push(PlaceScore { place, score: 0.0 });
            }
        }

        results
    }

    #[allow(clippy::too_many_arguments)]
    fn build_results(
        &self,
        text: &str,
        level_words: &[Vec<String>],
        current_ids: Option<Vec<PlaceId>>,
        name_token: Option<&str>,
        default_country: Option<&str>,
        mode: Mode,
        last_found_level: Option<usize>,
        num_results: usize,
        error_logged: &mut bool,
    ) -> Vec<PlaceScore> {
        let mut results = Vec::new();

        let Some(mut current) = current_ids else {
            // reported even when an earlier anomaly already was
            if let Some(handler) = self.handler {
                if self.contains_non_noise_levels(level_words) {
                    handler.place_not_found(text, level_words);
                }
            }
            return results;
        };

        if mode == Mode::Required && last_found_level != Some(0) {
            // the finest level never matched; this mode returns nothing
            return results;
        }

        let name_token = name_token.unwrap_or("");

        if current.len() > 1 && default_country.is_some_and(|c| !c.is_empty()) {
            // TODO: restrict multi-candidate sets to subplaces of the
            // default country once country name aliases are loaded
        }

        if current.len() > 1 {
            current = remove_children(self.store, &current);
        }

        if current.len() > 1 {
            for &id in &current {
                if let Some(place) = place_or_log(self.store, id) {
                    let score = score::score_match(self.config, self.normalizer, name_token, &place);
                    results.push(PlaceScore {
                        place: (*place).clone(),
                        score,
                    });
                }
            }
            results.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.place.id.cmp(&b.place.id))
            });
            results.truncate(num_results);

            if let Some(handler) = self.handler {
                if !*error_logged {
                    if let Some(first) = results.first() {
                        handler.ambiguous(text, level_words, &current, &first.place);
                        *error_logged = true;
                    }
                }
            }
        } else if let Some(&id) = current.first() {
            if let Some(place) = place_or_log(self.store, id) {
                let score = score::score_match(self.config, self.normalizer, name_token, &place);
                results.push(PlaceScore {
                    place: (*place).clone(),
                    score,
                });
            }
        }

        results
    }

    fn filter_types(&self, type_token: &str, ids: &[PlaceId]) -> Vec<PlaceId> {
        ids.iter()
            .copied()
            .filter(|&id| {
                let Some(place) = place_or_log(self.store, id) else {
                    return false;
                };
                // does the primary name, or one of the types, contain it?
                self.normalizer.normalize(&place.name).contains(type_token)
                    || place
                        .types
                        .iter()
                        .any(|t| self.normalizer.normalize(t).contains(type_token))
            })
            .collect()
    }

    fn minus_children(&self, ids: Option<&[PlaceId]>) -> Vec<PlaceId> {
        ids.map(|ids| remove_children(self.store, ids))
            .unwrap_or_default()
    }

    fn contains_non_noise_words(&self, words: &[String]) -> bool {
        words
            .iter()
            .any(|w| !self.config.noise_words.contains(w.as_str()))
    }

    fn contains_non_noise_levels(&self, level_words: &[Vec<String>]) -> bool {
        level_words.iter().any(|w| self.contains_non_noise_words(w))
    }
}
