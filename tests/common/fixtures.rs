//! Test fixtures: a small, known chart dataset.
//!
//! The global chart covers the worked example from the series contract:
//! TRACK_ONE charts on 2021-01-01 (rank 5) and 2021-01-03 (rank 10),
//! TRACK_TWO only on 2021-01-02 (rank 1). Germany carries its own, different
//! entries for the same window so region routing is observable.

use super::constants::*;
use charts_server::chart_store::{
    AudioFeatures, ChartEntry, ChartScope, ChartStore, Region, SqliteChartStore, Track,
};
use chrono::NaiveDate;
use tempfile::TempDir;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn entry(track_id: &str, day: &str, rank: u32, streams: u64) -> ChartEntry {
    ChartEntry {
        track_id: track_id.to_string(),
        date: date(day),
        rank,
        streams,
    }
}

fn features(danceability: f64, energy: f64, tempo: f64) -> AudioFeatures {
    AudioFeatures {
        danceability,
        energy,
        loudness: -6.0,
        speechiness: 0.06,
        acousticness: 0.1,
        instrumentalness: 0.0,
        liveness: 0.12,
        valence: 0.45,
        tempo,
        duration_ms: 200_000.0,
    }
}

fn region(name: &str, alpha2: &str, alpha3: &str, geo_region: &str, geo_subregion: &str) -> Region {
    Region {
        name: name.to_string(),
        iso_alpha2: alpha2.to_string(),
        iso_alpha3: alpha3.to_string(),
        geo_region: geo_region.to_string(),
        geo_subregion: geo_subregion.to_string(),
    }
}

/// Creates a temporary chart database seeded with the test dataset.
///
/// Returns the temp dir (keep it alive) and the opened store.
pub fn create_test_chart_db() -> (TempDir, SqliteChartStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = SqliteChartStore::new(temp_dir.path().join("charts.db"), 2)
        .expect("Failed to create chart store");

    store
        .insert_track(&Track {
            id: TRACK_ONE.to_string(),
            name: "Blinding Lights".to_string(),
            artists: vec!["The Weeknd".to_string()],
            features: features(0.51, 0.73, 171.0),
        })
        .expect("Failed to insert track");
    store
        .insert_track(&Track {
            id: TRACK_TWO.to_string(),
            name: "ROCKSTAR".to_string(),
            artists: vec!["DaBaby".to_string(), "Roddy Ricch".to_string()],
            features: features(0.75, 0.69, 90.0),
        })
        .expect("Failed to insert track");
    store
        .insert_track(&Track {
            id: TRACK_UNCHARTED.to_string(),
            name: "Supalonely".to_string(),
            artists: vec!["BENEE".to_string(), "Gus Dapperton".to_string()],
            features: features(0.86, 0.63, 129.0),
        })
        .expect("Failed to insert track");

    for r in [
        region("Germany", "DE", "DEU", "Europe", "Western Europe"),
        region("France", "FR", "FRA", "Europe", "Western Europe"),
        region("Sweden", "SE", "SWE", "Europe", "Northern Europe"),
        region("Japan", "JP", "JPN", "Asia", "Eastern Asia"),
    ] {
        store.insert_region(&r).expect("Failed to insert region");
    }

    store
        .insert_chart_entries(
            &ChartScope::Global,
            &[
                entry(TRACK_ONE, "2021-01-01", 5, 41_000_000),
                entry(TRACK_ONE, "2021-01-03", 10, 39_000_000),
                entry(TRACK_TWO, "2021-01-02", 1, 45_000_000),
                // A later day whose top entry has no metadata row
                entry(TRACK_WITHOUT_METADATA, "2021-02-01", 1, 1_000_000),
                entry(TRACK_ONE, "2021-02-01", 2, 900_000),
            ],
        )
        .expect("Failed to insert global entries");

    store
        .insert_chart_entries(
            &ChartScope::Region("Germany".to_string()),
            &[
                entry(TRACK_TWO, "2021-01-01", 2, 700_000),
                entry(TRACK_ONE, "2021-01-02", 7, 650_000),
                entry(TRACK_TWO, "2021-01-02", 3, 640_000),
            ],
        )
        .expect("Failed to insert Germany entries");

    (temp_dir, store)
}
