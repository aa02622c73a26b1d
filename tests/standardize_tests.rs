//! Integration tests for place standardization.
//!
//! These run against the full public API with a small fixture
//! gazetteer: the United States and France, Missouri (with its "Mo"
//! alternate name), St. Louis and its cemetery, Île-de-France, and a
//! few Springfields for ambiguity.

use std::sync::{Arc, Mutex};

use meridian::{
    AltName, ErrorHandler, InMemoryGazetteer, Mode, Place, PlaceId, Standardizer,
    StandardizerConfig,
};

const USA: PlaceId = 1500;
const FRANCE: PlaceId = 1600;
const MISSOURI: PlaceId = 10;
const ST_LOUIS: PlaceId = 20;
const ST_LOUIS_CEMETERY: PlaceId = 30;
const ILE_DE_FRANCE: PlaceId = 40;
const SPRINGFIELD_MO: PlaceId = 50;
const SPRINGFIELD_MO_2: PlaceId = 55;
const SPRINGFIELD_FR: PlaceId = 60;
const LAKEVIEW: PlaceId = 80;
const GREENE_COUNTY: PlaceId = 90;
const OAKDALE: PlaceId = 95;

fn fixture_config() -> StandardizerConfig {
    StandardizerConfig::builder()
        .type_words(["county", "cemetery", "township", "city"])
        .abbreviation("mo", "missouri")
        .noise_words(["of", "the"])
        .large_countries([USA])
        .large_country_level_weights([0.7, 0.8, 0.95, 1.0])
        .medium_country_level_weights([0.8, 0.9, 0.95, 1.0])
        .small_country_level_weights([0.9, 0.92, 0.85, 0.8])
        .primary_match_weight(0.4)
        .build()
}

fn place(id: PlaceId, name: &str, level: u8, located_in_id: PlaceId, country_id: PlaceId) -> Place {
    Place {
        id,
        name: name.into(),
        level,
        located_in_id,
        country_id,
        ..Place::default()
    }
}

fn fixture_places() -> Vec<Place> {
    vec![
        place(USA, "United States", 1, 0, USA),
        place(FRANCE, "France", 1, 0, FRANCE),
        Place {
            alt_names: vec![AltName::new("Mo", None)],
            types: vec!["state".into()],
            ..place(MISSOURI, "Missouri", 2, USA, USA)
        },
        Place {
            types: vec!["city".into()],
            ..place(ST_LOUIS, "St. Louis", 3, MISSOURI, USA)
        },
        Place {
            types: vec!["cemetery".into()],
            ..place(ST_LOUIS_CEMETERY, "St. Louis Cemetery", 4, ST_LOUIS, USA)
        },
        place(ILE_DE_FRANCE, "Île-de-France", 2, FRANCE, FRANCE),
        Place {
            types: vec!["town".into()],
            ..place(SPRINGFIELD_MO, "Springfield", 3, MISSOURI, USA)
        },
        Place {
            types: vec!["village".into()],
            ..place(SPRINGFIELD_MO_2, "Springfield", 3, MISSOURI, USA)
        },
        place(SPRINGFIELD_FR, "Springfield", 3, ILE_DE_FRANCE, FRANCE),
        place(LAKEVIEW, "Lakeview", 3, MISSOURI, USA),
        Place {
            types: vec!["county".into()],
            ..place(GREENE_COUNTY, "Greene County", 3, MISSOURI, USA)
        },
        place(OAKDALE, "Oakdale", 4, GREENE_COUNTY, USA),
    ]
}

fn standardizer() -> Standardizer {
    let config = fixture_config();
    let store = InMemoryGazetteer::from_places(fixture_places(), &config);
    Standardizer::new(config, store)
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    TokenNotFound {
        level: usize,
        candidates: Vec<PlaceId>,
    },
    SkippingParentLevel {
        level: usize,
        candidates: Vec<PlaceId>,
    },
    TypeNotFound {
        level: usize,
        candidates: Vec<PlaceId>,
    },
    Ambiguous {
        candidates: Vec<PlaceId>,
        chosen: PlaceId,
    },
    PlaceNotFound,
}

#[derive(Clone, Default)]
struct Recording(Arc<Mutex<Vec<Event>>>);

impl Recording {
    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

impl ErrorHandler for Recording {
    fn token_not_found(
        &self,
        _text: &str,
        _level_words: &[Vec<String>],
        level: usize,
        candidate_ids: &[PlaceId],
    ) {
        self.0.lock().unwrap().push(Event::TokenNotFound {
            level,
            candidates: candidate_ids.to_vec(),
        });
    }

    fn skipping_parent_level(
        &self,
        _text: &str,
        _level_words: &[Vec<String>],
        level: usize,
        candidate_ids: &[PlaceId],
    ) {
        self.0.lock().unwrap().push(Event::SkippingParentLevel {
            level,
            candidates: candidate_ids.to_vec(),
        });
    }

    fn type_not_found(
        &self,
        _text: &str,
        _level_words: &[Vec<String>],
        level: usize,
        candidate_ids: &[PlaceId],
    ) {
        self.0.lock().unwrap().push(Event::TypeNotFound {
            level,
            candidates: candidate_ids.to_vec(),
        });
    }

    fn ambiguous(
        &self,
        _text: &str,
        _level_words: &[Vec<String>],
        candidate_ids: &[PlaceId],
        chosen: &Place,
    ) {
        self.0.lock().unwrap().push(Event::Ambiguous {
            candidates: candidate_ids.to_vec(),
            chosen: chosen.id,
        });
    }

    fn place_not_found(&self, _text: &str, _level_words: &[Vec<String>]) {
        self.0.lock().unwrap().push(Event::PlaceNotFound);
    }
}

fn recording_standardizer() -> (Standardizer, Recording) {
    let mut s = standardizer();
    let recording = Recording::default();
    s.set_error_handler(recording.clone());
    (s, recording)
}

#[test]
fn resolves_a_fully_qualified_place() {
    let s = standardizer();
    let results = s.standardize("St. Louis, Missouri", None, Mode::Best, 3);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place.id, ST_LOUIS);
    // level-3 weight for a large country, plus the primary-name bonus
    // because "stlouis" occurs in the normalized name
    assert!((results[0].score - (0.95 + 0.4)).abs() < 1e-9);
}

#[test]
fn resolves_commaless_input_by_releveling() {
    let s = standardizer();
    let results = s.standardize("St Louis Mo", None, Mode::Best, 3);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place.id, ST_LOUIS);
    // and identically to the punctuated form
    assert_eq!(results, s.standardize("St. Louis, Missouri", None, Mode::Best, 3));
}

#[test]
fn required_mode_accepts_a_match_on_the_finest_level() {
    let s = standardizer();
    let results = s.standardize("Missouri", None, Mode::Required, 3);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place.id, MISSOURI);
}

#[test]
fn required_mode_rejects_an_unmatched_finest_level() {
    let (s, recording) = recording_standardizer();
    let results = s.standardize("Nowhere, Missouri", None, Mode::Required, 3);

    assert!(results.is_empty());
    assert_eq!(recording.events(), vec![Event::TokenNotFound {
        level: 0,
        candidates: vec![MISSOURI],
    }]);
}

#[test]
fn new_mode_synthesizes_a_place_under_the_best_match() {
    let s = standardizer();
    let results = s.standardize("Nowhere, Missouri", None, Mode::New, 3);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place.name, "Nowhere");
    assert_eq!(results[0].place.located_in_id, MISSOURI);
    assert_eq!(results[0].place.id, 0);
    assert_eq!(results[0].score, 0.0);
}

#[test]
fn new_mode_passes_through_full_matches() {
    let s = standardizer();
    let results = s.standardize("St. Louis, Missouri", None, Mode::New, 3);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place.id, ST_LOUIS);
}

#[test]
fn type_words_disambiguate_between_candidates() {
    let s = standardizer();

    // "cemetery" picks the cemetery out of the shared "stlouis" token
    let results = s.standardize("St. Louis Cemetery, Missouri", None, Mode::Best, 3);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place.id, ST_LOUIS_CEMETERY);

    // and the fully qualified form agrees
    let results = s.standardize("St. Louis Cemetery, St. Louis, Missouri", None, Mode::Best, 1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place.id, ST_LOUIS_CEMETERY);
}

#[test]
fn unmatched_type_token_reports_and_keeps_the_candidates() {
    let (s, recording) = recording_standardizer();
    let results = s.standardize("Springfield Township, Missouri", None, Mode::Best, 3);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].place.id, SPRINGFIELD_MO);
    assert_eq!(results[1].place.id, SPRINGFIELD_MO_2);
    assert!(matches!(recording.events()[0], Event::TypeNotFound { .. }));
}

#[test]
fn ambiguous_results_sort_by_score_then_id() {
    let (s, recording) = recording_standardizer();
    let results = s.standardize("Springfield", None, Mode::Best, 3);

    // two large-country places outscore the French one; the equal pair
    // orders by ascending id
    assert_eq!(
        results.iter().map(|r| r.place.id).collect::<Vec<_>>(),
        vec![SPRINGFIELD_MO, SPRINGFIELD_MO_2, SPRINGFIELD_FR]
    );
    assert!(results[0].score >= results[1].score);
    assert!(results[1].score > results[2].score);

    assert_eq!(recording.events(), vec![Event::Ambiguous {
        candidates: vec![SPRINGFIELD_MO, SPRINGFIELD_MO_2, SPRINGFIELD_FR],
        chosen: SPRINGFIELD_MO,
    }]);
}

#[test]
fn results_respect_num_results() {
    let s = standardizer();
    let results = s.standardize("Springfield", None, Mode::Best, 2);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].place.id, SPRINGFIELD_MO);
}

#[test]
fn a_country_match_is_never_skipped_over() {
    let (s, recording) = recording_standardizer();
    let results = s.standardize("St. Louis, France", None, Mode::Best, 3);

    // St. Louis is not in France; the country match survives
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place.id, FRANCE);
    assert!(matches!(recording.events()[0], Event::TokenNotFound { .. }));
}

#[test]
fn a_level_can_attach_under_its_grandparent() {
    let (s, recording) = recording_standardizer();
    let results = s.standardize("Oakdale, Springfield, Missouri", None, Mode::Best, 3);

    // Oakdale is in Greene County, not Springfield; the middle level is
    // skipped and Oakdale attaches beneath Missouri
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place.id, OAKDALE);
    assert_eq!(recording.events(), vec![Event::SkippingParentLevel {
        level: 0,
        candidates: vec![OAKDALE],
    }]);
}

#[test]
fn diacritics_fold_to_ascii() {
    let s = standardizer();
    let accented = s.standardize("Île-de-France, France", None, Mode::Best, 3);
    assert_eq!(accented.len(), 1);
    assert_eq!(accented[0].place.id, ILE_DE_FRANCE);

    let plain = s.standardize("Ile de France, France", None, Mode::Best, 3);
    assert_eq!(accented, plain);
}

#[test]
fn rename_suffixes_are_dropped() {
    let s = standardizer();
    // "X or Y" keeps only the right-hand name
    let results = s.standardize("Springfield or Lakeview, Missouri", None, Mode::Best, 3);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place.id, LAKEVIEW);
}

#[test]
fn abbreviation_expansion_is_transparent_to_callers() {
    // with "st" -> "saint" configured, both spellings of a multi-word
    // level resolve identically (the index is built under the same rules)
    let config = StandardizerConfig::builder()
        .type_words(["county", "cemetery", "township", "city"])
        .abbreviation("st", "saint")
        .abbreviation("mo", "missouri")
        .large_countries([USA])
        .build();
    let store = InMemoryGazetteer::from_places(fixture_places(), &config);
    let s = Standardizer::new(config, store);

    let abbreviated = s.standardize("St. Louis, Missouri", None, Mode::Best, 3);
    let spelled_out = s.standardize("Saint Louis, Missouri", None, Mode::Best, 3);
    assert_eq!(abbreviated.len(), 1);
    assert_eq!(abbreviated[0].place.id, ST_LOUIS);
    assert_eq!(abbreviated, spelled_out);
}

#[test]
fn noise_only_input_is_quietly_empty() {
    let (s, recording) = recording_standardizer();
    assert!(s.standardize("of the", None, Mode::Best, 3).is_empty());
    assert!(s.standardize("", None, Mode::Best, 3).is_empty());
    assert!(recording.events().is_empty());
}

#[test]
fn unmatched_input_reports_place_not_found() {
    let (s, recording) = recording_standardizer();
    let results = s.standardize("Nowhere At All", None, Mode::Best, 3);

    assert!(results.is_empty());
    let events = recording.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], Event::TokenNotFound { .. }));
    assert_eq!(events[1], Event::PlaceNotFound);
}

#[test]
fn at_most_one_anomaly_is_reported_per_call() {
    let (s, recording) = recording_standardizer();
    // two unmatched levels, but only the first is reported
    let results = s.standardize("Nowhere, Elsewhere, Missouri", None, Mode::Best, 3);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place.id, MISSOURI);
    assert_eq!(recording.events().len(), 1);
    assert!(matches!(recording.events()[0], Event::TokenNotFound { .. }));
}

#[test]
fn identical_inputs_yield_identical_outputs() {
    let s = standardizer();
    for text in ["Springfield", "St Louis Mo", "Île-de-France, France"] {
        let first = s.standardize(text, None, Mode::Best, 3);
        let second = s.standardize(text, None, Mode::Best, 3);
        assert_eq!(first, second, "non-deterministic output for {text:?}");
    }
}

#[test]
fn every_returned_place_is_in_the_gazetteer() {
    let s = standardizer();
    for result in s.standardize("Springfield", None, Mode::Best, 10) {
        let stored = s.place(result.place.id).expect("result must be a real place");
        assert_eq!(stored.name, result.place.name);
    }
}

#[test]
fn default_country_is_a_reserved_no_op() {
    // the parameter is accepted for forward compatibility; today it
    // must not change matching. When country filtering lands, this
    // test should start preferring the French Springfield.
    let s = standardizer();
    let with_default = s.standardize("Springfield", Some("France"), Mode::Best, 3);
    let without = s.standardize("Springfield", None, Mode::Best, 3);
    assert_eq!(with_default, without);
}

#[test]
fn bulk_standardization_matches_the_scalar_path() {
    let s = standardizer();
    let texts = ["St. Louis, Missouri", "Springfield", "Nowhere, Missouri"];
    let bulk = s.standardize_bulk(&texts, None, Mode::New, 3);
    assert_eq!(bulk.len(), texts.len());
    for (text, batch) in texts.iter().zip(&bulk) {
        assert_eq!(batch, &s.standardize(text, None, Mode::New, 3));
    }
}

#[cfg(feature = "backed")]
mod backed {
    use super::*;
    use meridian::{data, BackedGazetteer};

    #[test]
    fn backed_store_agrees_with_in_memory() {
        let config = fixture_config();
        let places = fixture_places();
        let words = data::build_word_index(&places, &config);

        let dir = tempfile::tempdir().unwrap();
        let backed = BackedGazetteer::open(dir.path()).unwrap();
        backed.import(places.clone(), words).unwrap();
        let backed = Standardizer::new(config.clone(), backed);

        let in_memory = Standardizer::new(
            config.clone(),
            InMemoryGazetteer::from_places(places, &config),
        );

        for text in [
            "St. Louis, Missouri",
            "St Louis Mo",
            "Springfield",
            "St. Louis Cemetery, Missouri",
            "Nowhere, Missouri",
        ] {
            assert_eq!(
                backed.standardize(text, None, Mode::Best, 3),
                in_memory.standardize(text, None, Mode::Best, 3),
                "backed and in-memory stores disagree on {text:?}"
            );
        }
    }
}
