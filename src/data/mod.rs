//! Loading the gazetteer from its text format.
//!
//! Two record kinds, both `|`-delimited, one record per line:
//!
//! - `places`: `id | name | alt_names | types | located_in_id |
//!   also_located_in_ids | level | country_id | [latitude] |
//!   [longitude] | [sources]`. Within `alt_names`, `types`,
//!   `also_located_in_ids`, and `sources`, `~` separates entries;
//!   within an alt name or source entry, the first `:` separates text
//!   from its tag.
//! - `place_words`: `word | comma_separated_ids`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;

pub use error::DataError;
use error::Result;

use crate::config::StandardizerConfig;
use crate::normalize::Normalizer;
use crate::place::{AltName, Place, PlaceId, Source};
use crate::resolve::build_level_tokens;

/// Read a `places` file.
pub fn read_places_file(path: impl AsRef<Path>) -> Result<Vec<Place>> {
    read_places(BufReader::new(File::open(path)?))
}

/// Read `places` records from any buffered reader.
pub fn read_places(reader: impl BufRead) -> Result<Vec<Place>> {
    let mut places = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        places.push(parse_place_record(&line).map_err(|reason| DataError::MalformedPlace {
            line: index + 1,
            reason,
        })?);
    }
    Ok(places)
}

/// Read a `place_words` file.
pub fn read_word_index_file(path: impl AsRef<Path>) -> Result<Vec<(String, Vec<PlaceId>)>> {
    read_word_index(BufReader::new(File::open(path)?))
}

/// Read `place_words` records from any buffered reader.
pub fn read_word_index(reader: impl BufRead) -> Result<Vec<(String, Vec<PlaceId>)>> {
    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let malformed = |reason: String| DataError::MalformedWord {
            line: index + 1,
            reason,
        };
        let (word, ids) = line
            .split_once('|')
            .ok_or_else(|| malformed("expected 'word|ids'".into()))?;
        let ids = ids
            .split(',')
            .map(|field| {
                field
                    .parse::<PlaceId>()
                    .map_err(|e| malformed(format!("id {field:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        entries.push((word.to_owned(), ids));
    }
    Ok(entries)
}

/// Derive the inverted word index from the places themselves.
///
/// Each place is keyed under the name token of its primary name and of
/// every alternate name, computed with the same tokenization the
/// engine applies at lookup time, so an index built here always agrees
/// with how input text will be tokenized under the same configuration.
/// (Production deployments ship a prebuilt `place_words` file instead;
/// this covers tests and small custom gazetteers.)
pub fn build_word_index(
    places: &[Place],
    config: &StandardizerConfig,
) -> Vec<(String, Vec<PlaceId>)> {
    let normalizer = Normalizer::new();
    let mut index: AHashMap<String, Vec<PlaceId>> = AHashMap::new();
    for place in places {
        for name in std::iter::once(place.name.as_str())
            .chain(place.alt_names.iter().map(|a| a.name.as_str()))
        {
            let words = normalizer.words(name);
            let tokens = build_level_tokens(&words, 0, config);
            if let Some(key) = tokens.name {
                let ids = index.entry(key).or_default();
                if !ids.contains(&place.id) {
                    ids.push(place.id);
                }
            }
        }
    }
    index.into_iter().collect()
}

fn parse_place_record(line: &str) -> std::result::Result<Place, String> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < 8 {
        return Err(format!("expected at least 8 fields, got {}", fields.len()));
    }

    let int = |name: &str, value: &str| {
        value
            .parse::<PlaceId>()
            .map_err(|e| format!("{name} {value:?}: {e}"))
    };
    let optional_real = |name: &str, value: Option<&&str>| match value {
        Some(v) if !v.is_empty() => v
            .parse::<f64>()
            .map_err(|e| format!("{name} {v:?}: {e}")),
        _ => Ok(0.0),
    };

    let also_located_in_ids = if fields[5].is_empty() {
        Vec::new()
    } else {
        fields[5]
            .split('~')
            .map(|field| int("also_located_in_id", field))
            .collect::<std::result::Result<_, _>>()?
    };

    Ok(Place {
        id: int("id", fields[0])?,
        name: fields[1].to_owned(),
        alt_names: split_tagged(fields[2])
            .map(|(name, source)| AltName::new(name, source))
            .collect(),
        types: if fields[3].is_empty() {
            Vec::new()
        } else {
            fields[3].split('~').map(str::to_owned).collect()
        },
        located_in_id: int("located_in_id", fields[4])?,
        also_located_in_ids,
        level: fields[6]
            .parse::<u8>()
            .map_err(|e| format!("level {:?}: {e}", fields[6]))?,
        country_id: int("country_id", fields[7])?,
        latitude: optional_real("latitude", fields.get(8))?,
        longitude: optional_real("longitude", fields.get(9))?,
        sources: split_tagged(fields.get(10).copied().unwrap_or(""))
            .map(|(source, id)| Source::new(source, id))
            .collect(),
    })
}

/// Split a `~`-separated list of `text[:tag]` entries. A `:` at
/// position zero does not split, matching the loader this format came
/// from.
fn split_tagged(field: &str) -> impl Iterator<Item = (String, Option<String>)> + '_ {
    field
        .split('~')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.find(':') {
            Some(pos) if pos > 0 => (
                entry[..pos].to_owned(),
                Some(entry[pos + 1..].to_owned()),
            ),
            _ => (entry.to_owned(), None),
        })
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum DataError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        #[error("malformed place record at line {line}: {reason}")]
        MalformedPlace { line: usize, reason: String },
        #[error("malformed place_words record at line {line}: {reason}")]
        MalformedWord { line: usize, reason: String },
    }

    pub type Result<T> = std::result::Result<T, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACES: &str = "\
1500|United States||country|0||1|1500|38.0|-97.0|
10|Missouri|Mo:abbr~State of Missouri|state|1500||2|1500|38.5|-92.5|census:29
20|St. Louis||city~independent city|10|30|3|1500
";

    #[test]
    fn parses_place_records() {
        let places = read_places(PLACES.as_bytes()).unwrap();
        assert_eq!(places.len(), 3);

        let usa = &places[0];
        assert_eq!(usa.id, 1500);
        assert_eq!(usa.name, "United States");
        assert!(usa.alt_names.is_empty());
        assert_eq!(usa.types, vec!["country"]);
        assert_eq!(usa.located_in_id, 0);
        assert_eq!(usa.level, 1);
        assert_eq!(usa.latitude, 38.0);

        let missouri = &places[1];
        assert_eq!(missouri.alt_names, vec![
            AltName::new("Mo", Some("abbr".into())),
            AltName::new("State of Missouri", None),
        ]);
        assert_eq!(missouri.sources, vec![Source::new(
            "census",
            Some("29".into())
        )]);

        let st_louis = &places[2];
        assert_eq!(st_louis.types, vec!["city", "independent city"]);
        assert_eq!(st_louis.also_located_in_ids, vec![30]);
        assert_eq!(st_louis.latitude, 0.0);
        assert!(st_louis.sources.is_empty());
    }

    #[test]
    fn parses_word_index_records() {
        let words = read_word_index("missouri|10\nstlouis|20,21\n".as_bytes()).unwrap();
        assert_eq!(words, vec![
            ("missouri".to_string(), vec![10]),
            ("stlouis".to_string(), vec![20, 21]),
        ]);
    }

    #[test]
    fn reports_the_offending_line() {
        let err = read_places("1500|United States||country|0||1|1500\nnot-a-record".as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");

        let err = read_word_index("missouri|ten".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"), "got: {err}");
    }

    #[test]
    fn leading_colon_does_not_split_a_tag() {
        let places = read_places("5|X|:odd||0||1|5".as_bytes()).unwrap();
        assert_eq!(places[0].alt_names, vec![AltName::new(":odd", None)]);
    }
}
