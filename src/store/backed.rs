//! Gazetteer backed by an embedded key-value store.
//!
//! Two keyspaces mirror the relational schema: `places` keyed by id and
//! `place_words` keyed by word, each holding a JSON-encoded record.
//! Every read goes through a size- and time-bounded cache; a miss
//! issues one synchronous load against the store. Load failures are
//! logged and surface as absence, never as an error to the resolver.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use super::cache::TtlCache;
use super::error::Result;
use super::GazetteerStore;
use crate::place::{Place, PlaceId};

pub struct BackedGazetteer {
    places: sled::Tree,
    words: sled::Tree,
    place_cache: TtlCache<PlaceId, Arc<Place>>,
    word_cache: TtlCache<String, Vec<PlaceId>>,
}

impl BackedGazetteer {
    pub const PLACE_CACHE_MAX_SIZE: usize = 50_000;
    pub const WORD_CACHE_MAX_SIZE: usize = 50_000;
    pub const CACHE_TTL: Duration = Duration::from_secs(3600);

    const PLACES_TREE: &'static str = "places";
    const WORDS_TREE: &'static str = "place_words";

    /// Open (creating if absent) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)?;
        let places = db.open_tree(Self::PLACES_TREE)?;
        let words = db.open_tree(Self::WORDS_TREE)?;
        info!(places = places.len(), words = words.len(), "opened backed gazetteer");
        Ok(Self {
            places,
            words,
            place_cache: TtlCache::new(Self::PLACE_CACHE_MAX_SIZE, Self::CACHE_TTL),
            word_cache: TtlCache::new(Self::WORD_CACHE_MAX_SIZE, Self::CACHE_TTL),
        })
    }

    /// Populate both keyspaces. Used by the importer that turns the
    /// text-format gazetteer into a database, and by tests.
    pub fn import(
        &self,
        places: impl IntoIterator<Item = Place>,
        words: impl IntoIterator<Item = (String, Vec<PlaceId>)>,
    ) -> Result<()> {
        for place in places {
            self.places
                .insert(place.id.to_be_bytes(), serde_json::to_vec(&place)?)?;
        }
        for (word, ids) in words {
            self.words
                .insert(word.as_bytes(), serde_json::to_vec(&ids)?)?;
        }
        self.places.flush()?;
        self.words.flush()?;
        Ok(())
    }

    fn load_place(&self, id: PlaceId) -> Result<Option<Place>> {
        self.places
            .get(id.to_be_bytes())?
            .map(|bytes| serde_json::from_slice(&bytes).map_err(Into::into))
            .transpose()
    }

    fn load_word(&self, word: &str) -> Result<Option<Vec<PlaceId>>> {
        self.words
            .get(word.as_bytes())?
            .map(|bytes| serde_json::from_slice(&bytes).map_err(Into::into))
            .transpose()
    }
}

impl GazetteerStore for BackedGazetteer {
    fn place(&self, id: PlaceId) -> Option<Arc<Place>> {
        if let Some(hit) = self.place_cache.get(&id) {
            return Some(hit);
        }
        match self.load_place(id) {
            Ok(Some(place)) => {
                let place = Arc::new(place);
                self.place_cache.insert(id, place.clone());
                Some(place)
            }
            Ok(None) => None,
            Err(e) => {
                error!(id, error = %e, "error reading places");
                None
            }
        }
    }

    fn ids_for_word(&self, word: &str) -> Option<Vec<PlaceId>> {
        if let Some(hit) = self.word_cache.get(word) {
            return Some(hit);
        }
        match self.load_word(word) {
            Ok(Some(ids)) => {
                self.word_cache.insert(word.to_owned(), ids.clone());
                Some(ids)
            }
            Ok(None) => None,
            Err(e) => {
                error!(word, error = %e, "error reading place_words");
                None
            }
        }
    }
}
