//! The gazetteer data model: places, their alternate names and sources,
//! and the scored results returned by the standardizer.

use std::fmt;
use std::str::FromStr;

/// Identifier of a place in the gazetteer.
pub type PlaceId = u32;

/// Number of hierarchy levels in the gazetteer: 1 = country, 2 =
/// state/province, down to 4 at the finest resolution. Scoring clamps
/// deeper levels to this bound.
pub const MAX_LEVELS: usize = 4;

/// Gazetteer id of the United States. Matched US states (level 2 places
/// in this country) behave like countries for parent-skip purposes.
pub const USA_ID: PlaceId = 1500;

/// An alternate name for a place, optionally tagged with where it came from.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltName {
    pub name: String,
    pub source: Option<String>,
}

impl AltName {
    pub fn new(name: impl Into<String>, source: Option<String>) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// Provenance record for a place, optionally carrying the source's own id.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub source: String,
    pub id: Option<String>,
}

impl Source {
    pub fn new(source: impl Into<String>, id: Option<String>) -> Self {
        Self {
            source: source.into(),
            id,
        }
    }
}

/// A canonical gazetteer entry. Immutable after load.
///
/// `located_in_id` is the primary parent; `0` means the place is a root
/// (a country). `also_located_in_ids` lists secondary parents, e.g. a
/// town that moved counties. `level` runs from 1 (country) toward finer
/// resolution, and `country_id` is the country the place rolls up to.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub alt_names: Vec<AltName>,
    pub types: Vec<String>,
    pub located_in_id: PlaceId,
    pub also_located_in_ids: Vec<PlaceId>,
    pub level: u8,
    pub country_id: PlaceId,
    pub latitude: f64,
    pub longitude: f64,
    pub sources: Vec<Source>,
}

impl Place {
    /// Primary parent, or `None` for a root place.
    pub fn located_in(&self) -> Option<PlaceId> {
        (self.located_in_id > 0).then_some(self.located_in_id)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

/// A candidate place with its match score. Result lists sort by
/// descending score with ascending id as the deterministic tiebreak.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceScore {
    pub place: Place,
    pub score: f64,
}

/// Standardization mode.
///
/// - `Best`: return the closest matching place(s).
/// - `Required`: the match must include the left-most (finest) input
///   level, or no results are returned at all.
/// - `New`: like `Best`, but when the left-most level could not be
///   matched, return a synthetic place named after it and located in
///   the best match.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Best,
    Required,
    New,
}

impl FromStr for Mode {
    type Err = std::convert::Infallible;

    /// Case-insensitive; anything other than `"required"` or `"new"`
    /// parses as [`Mode::Best`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("required") {
            Mode::Required
        } else if s.eq_ignore_ascii_case("new") {
            Mode::New
        } else {
            Mode::Best
        })
    }
}
