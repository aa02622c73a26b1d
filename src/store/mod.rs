//! Read-only gazetteer storage.
//!
//! The engine sees the gazetteer through [`GazetteerStore`]: a place by
//! id, and the inverted word index mapping a normalized word to the ids
//! of every place whose name or alternate name contains it. Two
//! implementations are provided: [`InMemoryGazetteer`] over hash maps
//! loaded from the text format, and (with the `backed` feature) a
//! key-value store fronted by size- and time-bounded caches in
//! [`backed::BackedGazetteer`].

use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use tracing::error;

use crate::config::StandardizerConfig;
use crate::data;
use crate::error::MeridianError;
use crate::place::{Place, PlaceId};

#[cfg(feature = "backed")]
pub mod backed;
#[cfg(feature = "backed")]
mod cache;

#[cfg(feature = "backed")]
pub use error::StoreError;

/// Read interface over the gazetteer. Implementations are shared across
/// threads; lookups must be safe under concurrent callers.
///
/// Absence is not an error: a store that cannot produce a value (not
/// present, or a backing read failed and was logged) returns `None` and
/// the engine carries on.
pub trait GazetteerStore: Send + Sync {
    /// The place with this id, if the gazetteer has one.
    fn place(&self, id: PlaceId) -> Option<Arc<Place>>;

    /// Ids of the places whose name or alternate name normalizes to a
    /// form containing `word`. `None` when no place matches.
    fn ids_for_word(&self, word: &str) -> Option<Vec<PlaceId>>;
}

/// Look up a place, logging the anomaly when the id is dangling.
/// Missing places are recoverable everywhere in the engine.
pub(crate) fn place_or_log(store: &dyn GazetteerStore, id: PlaceId) -> Option<Arc<Place>> {
    let place = store.place(id);
    if place.is_none() {
        error!(id, "place not found in gazetteer");
    }
    place
}

/// The whole gazetteer in memory: the place arena and the word index.
pub struct InMemoryGazetteer {
    places: AHashMap<PlaceId, Arc<Place>>,
    words: AHashMap<String, Vec<PlaceId>>,
}

impl InMemoryGazetteer {
    /// Build from already-materialized indices.
    pub fn new(
        places: impl IntoIterator<Item = Place>,
        words: impl IntoIterator<Item = (String, Vec<PlaceId>)>,
    ) -> Self {
        Self {
            places: places
                .into_iter()
                .map(|p| (p.id, Arc::new(p)))
                .collect(),
            words: words.into_iter().collect(),
        }
    }

    /// Build from places alone, deriving the word index with
    /// [`crate::data::build_word_index`] under `config`'s tokenization
    /// rules. The index must agree with how the engine tokenizes input,
    /// which is why the configuration is required here.
    pub fn from_places(
        places: impl IntoIterator<Item = Place>,
        config: &StandardizerConfig,
    ) -> Self {
        let places: Vec<Place> = places.into_iter().collect();
        let words = data::build_word_index(&places, config);
        Self::new(places, words)
    }

    /// Load both indices from the `|`-delimited text format.
    pub fn from_files(
        places_path: impl AsRef<Path>,
        words_path: impl AsRef<Path>,
    ) -> std::result::Result<Self, MeridianError> {
        let places = data::read_places_file(places_path)?;
        let words = data::read_word_index_file(words_path)?;
        Ok(Self::new(places, words))
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }
}

impl GazetteerStore for InMemoryGazetteer {
    fn place(&self, id: PlaceId) -> Option<Arc<Place>> {
        self.places.get(&id).cloned()
    }

    fn ids_for_word(&self, word: &str) -> Option<Vec<PlaceId>> {
        self.words.get(word).cloned()
    }
}

/// Open the gazetteer the way the service deployment does: when
/// `DATABASE_URL` is set it names a key-value database to back the
/// store (caches in front, per-miss loads behind); otherwise the two
/// text files are read fully into memory.
#[cfg(feature = "backed")]
pub fn open_from_env(
    places_path: impl AsRef<Path>,
    words_path: impl AsRef<Path>,
) -> std::result::Result<Arc<dyn GazetteerStore>, MeridianError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => Ok(Arc::new(backed::BackedGazetteer::open(url)?)),
        _ => Ok(Arc::new(InMemoryGazetteer::from_files(
            places_path,
            words_path,
        )?)),
    }
}

#[cfg(feature = "backed")]
mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum StoreError {
        #[error("key-value store error: {0}")]
        Sled(#[from] sled::Error),
        #[error("record encoding error: {0}")]
        Encoding(#[from] serde_json::Error),
    }

    pub type Result<T> = std::result::Result<T, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StandardizerConfig;
    use crate::place::AltName;

    fn fixture() -> Vec<Place> {
        vec![
            Place {
                id: 10,
                name: "Missouri".into(),
                alt_names: vec![AltName::new("Mo", None)],
                level: 2,
                country_id: 1500,
                located_in_id: 1500,
                ..Place::default()
            },
            Place {
                id: 20,
                name: "St. Louis".into(),
                level: 3,
                country_id: 1500,
                located_in_id: 10,
                ..Place::default()
            },
        ]
    }

    #[test]
    fn from_places_indexes_names_and_alt_names() {
        let store = InMemoryGazetteer::from_places(fixture(), &StandardizerConfig::default());
        assert_eq!(store.ids_for_word("missouri"), Some(vec![10]));
        assert_eq!(store.ids_for_word("mo"), Some(vec![10]));
        assert_eq!(store.ids_for_word("stlouis"), Some(vec![20]));
        assert_eq!(store.ids_for_word("nowhere"), None);
    }

    #[test]
    fn place_lookup_returns_none_for_dangling_ids() {
        let store = InMemoryGazetteer::from_places(fixture(), &StandardizerConfig::default());
        assert!(store.place(10).is_some());
        assert!(store.place(999).is_none());
        assert!(place_or_log(&store, 999).is_none());
    }
}
