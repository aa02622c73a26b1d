//! Basic place standardization
//!
//! Demonstrates the fundamental operations:
//! - Building a configuration and a small in-memory gazetteer
//! - Resolving punctuated, abbreviated, and commaless input
//! - The three standardization modes

use meridian::{
    InMemoryGazetteer, Mode, Place, PlaceScore, Standardizer, StandardizerConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    meridian::init_logging(tracing::Level::WARN)?;

    let config = StandardizerConfig::builder()
        .type_words(["county", "cemetery", "city"])
        .abbreviation("mo", "missouri")
        .noise_words(["of", "the"])
        .large_countries([1500])
        .build();

    // a production deployment loads this from the gazetteer files; see
    // InMemoryGazetteer::from_files and meridian::open_from_env
    let gazetteer = InMemoryGazetteer::from_places(sample_places(), &config);
    let standardizer = Standardizer::new(config, gazetteer);

    for text in [
        "St. Louis, Missouri",
        "St Louis Mo",
        "St. Louis Cemetery, Missouri",
    ] {
        println!("Standardizing {text:?}:");
        let results = standardizer.standardize(text, None, Mode::Best, 3);
        print_results(&standardizer, &results);
    }

    // NEW mode synthesizes a place for the unmatched finest level
    println!("Standardizing \"Nowhere, Missouri\" in NEW mode:");
    let results = standardizer.standardize("Nowhere, Missouri", None, Mode::New, 3);
    print_results(&standardizer, &results);

    Ok(())
}

fn print_results(standardizer: &Standardizer, results: &[PlaceScore]) {
    if results.is_empty() {
        println!("  (no results)");
        return;
    }
    for (i, result) in results.iter().enumerate() {
        println!(
            "  {}. {} - Score: {:.3}",
            i + 1,
            standardizer.full_name(&result.place),
            result.score
        );
    }
}

fn sample_places() -> Vec<Place> {
    vec![
        Place {
            id: 1500,
            name: "United States".into(),
            level: 1,
            country_id: 1500,
            ..Place::default()
        },
        Place {
            id: 10,
            name: "Missouri".into(),
            level: 2,
            located_in_id: 1500,
            country_id: 1500,
            ..Place::default()
        },
        Place {
            id: 20,
            name: "St. Louis".into(),
            types: vec!["city".into()],
            level: 3,
            located_in_id: 10,
            country_id: 1500,
            ..Place::default()
        },
        Place {
            id: 30,
            name: "St. Louis Cemetery".into(),
            types: vec!["cemetery".into()],
            level: 4,
            located_in_id: 20,
            country_id: 1500,
            ..Place::default()
        },
    ]
}
