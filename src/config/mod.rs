//! Standardizer configuration.
//!
//! A typed record holding the word classifications (type words,
//! abbreviations, noise words), the country-size buckets, and the
//! scoring weights. Build one fluently with
//! [`StandardizerConfigBuilder`], or parse the flat property format
//! with [`StandardizerConfig::from_properties`].

use ahash::{AHashMap, AHashSet};

use crate::error::MeridianError;
use crate::place::{MAX_LEVELS, PlaceId};

/// Everything the matching engine needs to know besides the gazetteer
/// itself. Read-only once the standardizer is constructed.
#[derive(Debug, Clone)]
pub struct StandardizerConfig {
    /// Common nouns indicating kind of place ("county", "cemetery", ...).
    /// Trailing type words become the disambiguating type token instead
    /// of part of the name token.
    pub type_words: AHashSet<String>,
    /// Word-level expansions applied inside multi-word levels ("st" ->
    /// "saint"). Single-word levels are left unexpanded.
    pub abbreviations: AHashMap<String, String>,
    /// Words carrying no lookup value; a level of nothing but noise
    /// words never triggers a not-found callback.
    pub noise_words: AHashSet<String>,
    /// Country ids scored with [`Self::large_country_level_weights`].
    pub large_countries: AHashSet<PlaceId>,
    /// Country ids scored with [`Self::medium_country_level_weights`].
    pub medium_countries: AHashSet<PlaceId>,
    pub large_country_level_weights: [f64; MAX_LEVELS],
    pub medium_country_level_weights: [f64; MAX_LEVELS],
    pub small_country_level_weights: [f64; MAX_LEVELS],
    /// Bonus added when the name token occurs in the normalized primary
    /// name of the candidate.
    pub primary_match_weight: f64,
}

impl Default for StandardizerConfig {
    fn default() -> Self {
        Self {
            type_words: AHashSet::new(),
            abbreviations: AHashMap::new(),
            noise_words: AHashSet::new(),
            large_countries: AHashSet::new(),
            medium_countries: AHashSet::new(),
            large_country_level_weights: [0.7, 0.8, 0.95, 1.0],
            medium_country_level_weights: [0.8, 0.9, 0.95, 1.0],
            small_country_level_weights: [0.9, 0.95, 0.95, 1.0],
            primary_match_weight: 0.4,
        }
    }
}

impl StandardizerConfig {
    pub fn builder() -> StandardizerConfigBuilder {
        StandardizerConfigBuilder::new()
    }

    /// Is `word` a type word? Abbreviations are expanded first, so
    /// `"co"` counts when it expands to `"county"`.
    pub fn is_type_word(&self, word: &str) -> bool {
        let word = self
            .abbreviations
            .get(word)
            .map(String::as_str)
            .unwrap_or(word);
        self.type_words.contains(word)
    }

    /// Parse the flat `key=value` property format used by the service
    /// deployment. Expected keys: `typeWords`, `abbreviations`,
    /// `noiseWords`, `largeCountries`, `mediumCountries`,
    /// `largeCountryLevelWeights`, `mediumCountryLevelWeights`,
    /// `smallCountryLevelWeights` (comma lists), and
    /// `primaryMatchWeight`. Blank lines and `#` comments are ignored.
    ///
    /// # Errors
    ///
    /// Any missing key, unparsable number, or weight vector whose
    /// length is not [`MAX_LEVELS`] fails construction.
    pub fn from_properties(text: &str) -> Result<Self, MeridianError> {
        let mut props: AHashMap<&str, &str> = AHashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                MeridianError::Config(format!("property line without '=': {line:?}"))
            })?;
            props.insert(key.trim(), value.trim());
        }

        let get = |key: &str| {
            props
                .get(key)
                .copied()
                .ok_or_else(|| MeridianError::Config(format!("missing property: {key}")))
        };

        let mut abbreviations = AHashMap::new();
        for entry in split_list(get("abbreviations")?) {
            let (abbr, expansion) = entry.split_once('=').ok_or_else(|| {
                MeridianError::Config(format!("abbreviation without '=': {entry:?}"))
            })?;
            abbreviations.insert(abbr.to_owned(), expansion.to_owned());
        }

        Ok(Self {
            type_words: split_list(get("typeWords")?).map(str::to_owned).collect(),
            abbreviations,
            noise_words: split_list(get("noiseWords")?).map(str::to_owned).collect(),
            large_countries: parse_id_set("largeCountries", get("largeCountries")?)?,
            medium_countries: parse_id_set("mediumCountries", get("mediumCountries")?)?,
            large_country_level_weights: parse_weights(
                "largeCountryLevelWeights",
                get("largeCountryLevelWeights")?,
            )?,
            medium_country_level_weights: parse_weights(
                "mediumCountryLevelWeights",
                get("mediumCountryLevelWeights")?,
            )?,
            small_country_level_weights: parse_weights(
                "smallCountryLevelWeights",
                get("smallCountryLevelWeights")?,
            )?,
            primary_match_weight: get("primaryMatchWeight")?.parse().map_err(|e| {
                MeridianError::Config(format!("primaryMatchWeight is not a number: {e}"))
            })?,
        })
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_id_set(key: &str, value: &str) -> Result<AHashSet<PlaceId>, MeridianError> {
    split_list(value)
        .map(|field| {
            field
                .parse::<PlaceId>()
                .map_err(|e| MeridianError::Config(format!("{key} entry {field:?}: {e}")))
        })
        .collect()
}

fn parse_weights(key: &str, value: &str) -> Result<[f64; MAX_LEVELS], MeridianError> {
    let fields: Vec<f64> = split_list(value)
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|e| MeridianError::Config(format!("{key} entry {field:?}: {e}")))
        })
        .collect::<Result<_, _>>()?;
    <[f64; MAX_LEVELS]>::try_from(fields).map_err(|fields| {
        MeridianError::Config(format!(
            "{key} must have exactly {MAX_LEVELS} entries, got {}",
            fields.len()
        ))
    })
}

/// Fluent builder over [`StandardizerConfig`], starting from the
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct StandardizerConfigBuilder {
    config: StandardizerConfig,
}

impl StandardizerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.type_words.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn abbreviation(mut self, abbr: impl Into<String>, expansion: impl Into<String>) -> Self {
        self.config.abbreviations.insert(abbr.into(), expansion.into());
        self
    }

    pub fn noise_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.noise_words.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn large_countries(mut self, ids: impl IntoIterator<Item = PlaceId>) -> Self {
        self.config.large_countries.extend(ids);
        self
    }

    pub fn medium_countries(mut self, ids: impl IntoIterator<Item = PlaceId>) -> Self {
        self.config.medium_countries.extend(ids);
        self
    }

    pub fn large_country_level_weights(mut self, weights: [f64; MAX_LEVELS]) -> Self {
        self.config.large_country_level_weights = weights;
        self
    }

    pub fn medium_country_level_weights(mut self, weights: [f64; MAX_LEVELS]) -> Self {
        self.config.medium_country_level_weights = weights;
        self
    }

    pub fn small_country_level_weights(mut self, weights: [f64; MAX_LEVELS]) -> Self {
        self.config.small_country_level_weights = weights;
        self
    }

    pub fn primary_match_weight(mut self, weight: f64) -> Self {
        self.config.primary_match_weight = weight;
        self
    }

    pub fn build(self) -> StandardizerConfig {
        self.config
    }
}
