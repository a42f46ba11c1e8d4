#![allow(dead_code)]
//! Shared corpora for the `tracksearch` integration tests.

use std::collections::{BTreeMap, BTreeSet};
use tracksearch::{Matches, Track};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// The three record corpus used by the search scenarios.
pub fn delerium_corpus() -> BTreeMap<String, Track> {
    BTreeMap::from([
        (
            "k1".to_string(),
            Track::new()
                .with_tag("artist", "Delerium")
                .with_tag("album", "Chimera")
                .with_tag("rating", 4),
        ),
        (
            "k2".to_string(),
            Track::new()
                .with_tag("artist", "Boards of Canada")
                .with_tag("album", "Geogaddi")
                .with_tag("rating", 5),
        ),
        (
            "k3".to_string(),
            Track::new()
                .with_tag("artist", "Delerium")
                .with_tag("album", "Karma")
                .with_tag("rating", 2),
        ),
    ])
}

/// A wider library with missing tags, lists and odd values.
pub fn library() -> BTreeMap<String, Track> {
    let rows: [(&str, &str, &str, &str, f64, i32); 10] = [
        ("a01", "Delerium", "Karma", "Silence", 4.0, 1997),
        ("a02", "Delerium", "Karma", "Euphoria (Firefly)", 3.0, 1997),
        ("a03", "Delerium", "Chimera", "After All", 5.0, 2003),
        ("a04", "Boards of Canada", "Geogaddi", "Music Is Math", 5.0, 2002),
        ("a05", "Boards of Canada", "Music Has the Right to Children", "Olson", 2.0, 1998),
        ("a06", "Aphex Twin", "Selected Ambient Works 85-92", "Xtal", 4.5, 1992),
        ("a07", "Aphex Twin", "Drukqs", "Avril 14th", 1.0, 2001),
        ("a08", "Massive Attack", "Mezzanine", "Teardrop", 4.0, 1998),
        ("a09", "Massive Attack", "Mezzanine", "Angel", 3.5, 1998),
        ("a10", "Portishead", "Dummy", "Roads", 0.0, 1994),
    ];
    let mut library: BTreeMap<String, Track> = rows
        .into_iter()
        .map(|(key, artist, album, title, rating, year)| {
            (
                key.to_string(),
                Track::new()
                    .with_tag("artist", artist)
                    .with_tag("album", album)
                    .with_tag("title", title)
                    .with_tag("rating", rating)
                    .with_tag("year", year),
            )
        })
        .collect();
    library.insert(
        "a11".to_string(),
        Track::new()
            .with_tag("artist", vec!["Delerium", "Sarah McLachlan"])
            .with_tag("title", "Silence (Remix)")
            .with_tag("genre", "trance"),
    );
    library.insert("a12".to_string(), Track::new().with_tag("title", "a=b <3 > x"));
    library.insert("a13".to_string(), Track::new());
    library
}

pub fn key_set(matches: &Matches<'_, String, Track>) -> BTreeSet<String> {
    matches.keys().map(|key| key.to_string()).collect()
}

pub fn search_keys(query: &str, corpus: &BTreeMap<String, Track>) -> Vec<String> {
    tracksearch::search(query, corpus)
        .into_keys()
        .cloned()
        .collect()
}
