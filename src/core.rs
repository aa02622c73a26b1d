//! The standardizer: the main handle tying together the gazetteer
//! store, the normalizer, the configuration, and the error handler.
//!
//! Construction happens once; every resolve call afterwards is
//! synchronous, read-only, and safe to issue from any thread. Prefer
//! passing a constructed [`Standardizer`] around explicitly; a
//! process-wide instance is available through [`install_shared`] /
//! [`shared`] for hosts that want the convenience.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{info, instrument};

use crate::config::StandardizerConfig;
use crate::error::MeridianError;
use crate::events::ErrorHandler;
use crate::normalize::Normalizer;
use crate::place::{Mode, Place, PlaceId, PlaceScore};
use crate::resolve::Resolver;
use crate::store::GazetteerStore;

/// Default and maximum result-list lengths used by hosts that accept
/// the count from untrusted input.
pub const DEFAULT_NUM_RESULTS: usize = 3;
pub const MAX_NUM_RESULTS: usize = 100;

/// Clamp a requested result count the way the service front end does:
/// non-positive falls back to [`DEFAULT_NUM_RESULTS`], anything above
/// [`MAX_NUM_RESULTS`] is capped there.
pub fn clamp_num_results(requested: i64) -> usize {
    if requested <= 0 {
        DEFAULT_NUM_RESULTS
    } else {
        (requested as usize).min(MAX_NUM_RESULTS)
    }
}

/// Resolves free-text place references against a gazetteer.
///
/// # Examples
///
/// ```rust
/// use meridian::{InMemoryGazetteer, Mode, Place, Standardizer, StandardizerConfig};
///
/// let config = StandardizerConfig::builder()
///     .large_countries([1500])
///     .primary_match_weight(0.4)
///     .build();
///
/// let gazetteer = InMemoryGazetteer::from_places(
///     [
///         Place {
///             id: 1500,
///             name: "United States".into(),
///             level: 1,
///             country_id: 1500,
///             ..Place::default()
///         },
///         Place {
///             id: 10,
///             name: "Missouri".into(),
///             level: 2,
///             country_id: 1500,
///             located_in_id: 1500,
///             ..Place::default()
///         },
///     ],
///     &config,
/// );
///
/// let standardizer = Standardizer::new(config, gazetteer);
/// let results = standardizer.standardize("Missouri, United States", None, Mode::Best, 3);
/// assert_eq!(results[0].place.id, 10);
/// ```
pub struct Standardizer {
    config: StandardizerConfig,
    normalizer: Normalizer,
    store: Arc<dyn GazetteerStore>,
    error_handler: Option<Box<dyn ErrorHandler>>,
}

impl Standardizer {
    pub fn new(config: StandardizerConfig, store: impl GazetteerStore + 'static) -> Self {
        Self::with_store(config, Arc::new(store))
    }

    #[instrument(name = "Initialize Standardizer", level = "info", skip_all)]
    pub fn with_store(config: StandardizerConfig, store: Arc<dyn GazetteerStore>) -> Self {
        info!(
            type_words = config.type_words.len(),
            abbreviations = config.abbreviations.len(),
            "standardizer initialized"
        );
        Self {
            config,
            normalizer: Normalizer::new(),
            store,
            error_handler: None,
        }
    }

    /// Replace the anomaly receiver. Callbacks fire on whichever thread
    /// runs the resolve call.
    pub fn set_error_handler(&mut self, handler: impl ErrorHandler + 'static) {
        self.error_handler = Some(Box::new(handler));
    }

    /// Resolve `text` to a ranked list of at most `num_results`
    /// candidate places.
    ///
    /// `default_country` is accepted for forward compatibility but does
    /// not affect matching yet.
    #[instrument(name = "Standardize", level = "debug", skip(self), fields(mode = ?mode))]
    pub fn standardize(
        &self,
        text: &str,
        default_country: Option<&str>,
        mode: Mode,
        num_results: usize,
    ) -> Vec<PlaceScore> {
        self.resolver().resolve(text, default_country, mode, num_results)
    }

    /// [`Standardizer::standardize`] with [`Mode::Best`] and no default
    /// country.
    pub fn standardize_simple(&self, text: &str, num_results: usize) -> Vec<PlaceScore> {
        self.standardize(text, None, Mode::Best, num_results)
    }

    /// The single best match, or `None`.
    pub fn standardize_best(&self, text: &str, default_country: Option<&str>) -> Option<Place> {
        self.standardize(text, default_country, Mode::Best, 1)
            .into_iter()
            .next()
            .map(|ps| ps.place)
    }

    /// Resolve a batch of texts in parallel. Output order matches input
    /// order; each entry is exactly what the scalar call would return.
    #[instrument(
        name = "Standardize Bulk",
        level = "info",
        skip(self, texts),
        fields(num_texts = texts.len(), mode = ?mode)
    )]
    pub fn standardize_bulk<T: AsRef<str> + Sync>(
        &self,
        texts: &[T],
        default_country: Option<&str>,
        mode: Mode,
        num_results: usize,
    ) -> Vec<Vec<PlaceScore>> {
        texts
            .par_iter()
            .map(|text| self.standardize(text.as_ref(), default_country, mode, num_results))
            .collect()
    }

    /// Direct gazetteer lookup.
    pub fn place(&self, id: PlaceId) -> Option<Arc<Place>> {
        self.store.place(id)
    }

    /// Render `place` with its ancestor chain: `"name, parent,
    /// grandparent, ..."` following primary `located_in` links. The
    /// walk is depth-bounded, so malformed data cannot hang it.
    pub fn full_name(&self, place: &Place) -> String {
        let mut buf = place.name.clone();
        let mut located_in = place.located_in();
        let mut remaining = crate::place::MAX_LEVELS * 4;
        while let Some(id) = located_in {
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            let Some(parent) = self.store.place(id) else {
                break;
            };
            buf.push_str(", ");
            buf.push_str(&parent.name);
            located_in = parent.located_in();
        }
        buf
    }

    pub fn config(&self) -> &StandardizerConfig {
        &self.config
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver {
            config: &self.config,
            normalizer: &self.normalizer,
            store: self.store.as_ref(),
            handler: self.error_handler.as_deref(),
        }
    }
}

static SHARED: OnceCell<Standardizer> = OnceCell::new();

/// Install the process-wide instance. Fails if one is already
/// installed; re-initialization is not supported.
pub fn install_shared(standardizer: Standardizer) -> Result<(), MeridianError> {
    SHARED
        .set(standardizer)
        .map_err(|_| MeridianError::Config("shared standardizer already installed".into()))
}

/// The process-wide instance, if one was installed.
pub fn shared() -> Option<&'static Standardizer> {
    SHARED.get()
}
