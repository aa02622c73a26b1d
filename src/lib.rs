//! Meridian - Place Name Standardization Library
//!
//! Meridian resolves free-text place references - the kind found in
//! genealogy records, noisy, abbreviated, and inconsistently
//! punctuated - to canonical entries in a curated gazetteer. Input like
//! `"St. Louis, Mo."` or the commaless `"St Louis Mo"` comes back as a
//! ranked list of gazetteer places with scores, or, when the caller
//! permits it, as a synthetic "new" place attached to the closest
//! match.
//!
//! # Quick Start
//!
//! ```rust
//! use meridian::{InMemoryGazetteer, Mode, Place, Standardizer, StandardizerConfig};
//!
//! let config = StandardizerConfig::builder()
//!     .type_words(["county", "cemetery"])
//!     .abbreviation("mo", "missouri")
//!     .large_countries([1500])
//!     .build();
//!
//! // a real deployment loads the gazetteer from its text files or a
//! // backing database; see `InMemoryGazetteer::from_files`
//! let gazetteer = InMemoryGazetteer::from_places(
//!     [
//!         Place {
//!             id: 1500,
//!             name: "United States".into(),
//!             level: 1,
//!             country_id: 1500,
//!             ..Place::default()
//!         },
//!         Place {
//!             id: 10,
//!             name: "Missouri".into(),
//!             level: 2,
//!             country_id: 1500,
//!             located_in_id: 1500,
//!             ..Place::default()
//!         },
//!         Place {
//!             id: 20,
//!             name: "St. Louis".into(),
//!             level: 3,
//!             country_id: 1500,
//!             located_in_id: 10,
//!             ..Place::default()
//!         },
//!     ],
//!     &config,
//! );
//!
//! let standardizer = Standardizer::new(config, gazetteer);
//!
//! let results = standardizer.standardize("St. Louis, Missouri", None, Mode::Best, 3);
//! assert_eq!(results[0].place.name, "St. Louis");
//!
//! // unmatched finest levels can synthesize a new place in NEW mode
//! let results = standardizer.standardize("Nowhere, Missouri", None, Mode::New, 3);
//! assert_eq!(results[0].place.name, "Nowhere");
//! assert_eq!(results[0].place.located_in_id, 10);
//! ```
//!
//! # How matching works
//!
//! Input levels (comma-separated chunks) are matched right to left
//! against an inverted word index, each accepted level constraining the
//! next to its descendants. Words that fail to match back off one at a
//! time and re-enter as their own level, which is what makes commaless
//! input work. Trailing type words ("county", "cemetery") disambiguate
//! rather than participate in the name. Anomalies - unmatched tokens,
//! skipped levels, ambiguity - are reported through an advisory
//! [`ErrorHandler`] and never fail the call.

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod config;
mod core;
pub mod data;
pub mod error;
mod events;
mod normalize;
mod place;
mod resolve;
pub mod store;

pub use config::{StandardizerConfig, StandardizerConfigBuilder};
pub use self::core::{
    clamp_num_results, install_shared, shared, Standardizer, DEFAULT_NUM_RESULTS, MAX_NUM_RESULTS,
};
pub use events::{ErrorHandler, LoggingErrorHandler};
pub use normalize::Normalizer;
pub use place::{AltName, Mode, Place, PlaceId, PlaceScore, Source, MAX_LEVELS, USA_ID};
#[cfg(feature = "backed")]
pub use store::backed::BackedGazetteer;
#[cfg(feature = "backed")]
pub use store::open_from_env;
pub use store::{GazetteerStore, InMemoryGazetteer};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the library.
///
/// Sets up structured logging with the given minimum level, overridable
/// through `RUST_LOG`. Call once at application start; later calls are
/// no-ops.
///
/// # Examples
///
/// ```rust
/// meridian::init_logging(tracing::Level::INFO)?;
/// # Ok::<(), meridian::error::MeridianError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::MeridianError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?;

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .init();
        Ok(())
    })
}
