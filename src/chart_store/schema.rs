//! SQLite schema definitions for the chart database.
//!
//! Tracks and regions use integer rowids with unique text IDs for lookups.
//! Chart entries reference tracks by their text ID directly: the chart scrape
//! and the track metadata dump were collected independently, so an entry may
//! legitimately reference a track with no metadata row.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

// =============================================================================
// Metadata Tables
// =============================================================================

/// Tracks table - static metadata and audio features
const TRACKS_TABLE: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true), // Spotify base62 ID
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("danceability", &SqlType::Real, non_null = true),
        sqlite_column!("energy", &SqlType::Real, non_null = true),
        sqlite_column!("loudness", &SqlType::Real, non_null = true),
        sqlite_column!("speechiness", &SqlType::Real, non_null = true),
        sqlite_column!("acousticness", &SqlType::Real, non_null = true),
        sqlite_column!("instrumentalness", &SqlType::Real, non_null = true),
        sqlite_column!("liveness", &SqlType::Real, non_null = true),
        sqlite_column!("valence", &SqlType::Real, non_null = true),
        sqlite_column!("tempo", &SqlType::Real, non_null = true),
        sqlite_column!("duration_ms", &SqlType::Real, non_null = true),
    ],
    indices: &[("idx_tracks_id", "id")],
    unique_constraints: &[&["id"]],
};

/// Track <-> artist name in billing order
const TRACK_ARTISTS_TABLE: Table = Table {
    name: "track_artists",
    columns: &[
        sqlite_column!("track_rowid", &SqlType::Integer, non_null = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("position", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_track_artists_track", "track_rowid")],
    unique_constraints: &[],
};

/// Regions table - countries that have their own Top-50 chart
const REGIONS_TABLE: Table = Table {
    name: "regions",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("iso_alpha2", &SqlType::Text, non_null = true),
        sqlite_column!("iso_alpha3", &SqlType::Text, non_null = true),
        sqlite_column!("geo_region", &SqlType::Text, non_null = true),
        sqlite_column!("geo_subregion", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_regions_name", "name")],
    unique_constraints: &[&["name"]],
};

// =============================================================================
// Chart Entry Tables
// =============================================================================
//
// Two structurally identical tables; the ChartScope branch selects one.
// Dates are ISO `YYYY-MM-DD` text, day granularity only, so lexicographic
// comparison is chronological comparison.

/// Global Top-50 chart entries
const GLOBAL_CHART_ENTRIES_TABLE: Table = Table {
    name: "global_chart_entries",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("track_id", &SqlType::Text, non_null = true),
        sqlite_column!("date", &SqlType::Text, non_null = true),
        sqlite_column!("rank", &SqlType::Integer, non_null = true),
        sqlite_column!("streams", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_global_entries_track", "track_id"),
        ("idx_global_entries_date", "date"),
    ],
    unique_constraints: &[&["track_id", "date"]],
};

/// Per-country Top-50 chart entries
const REGION_CHART_ENTRIES_TABLE: Table = Table {
    name: "region_chart_entries",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("region_name", &SqlType::Text, non_null = true),
        sqlite_column!("track_id", &SqlType::Text, non_null = true),
        sqlite_column!("date", &SqlType::Text, non_null = true),
        sqlite_column!("rank", &SqlType::Integer, non_null = true),
        sqlite_column!("streams", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_region_entries_region", "region_name"),
        ("idx_region_entries_track", "track_id"),
        ("idx_region_entries_date", "date"),
    ],
    unique_constraints: &[&["region_name", "track_id", "date"]],
};

// =============================================================================
// Versioned Schema Definition
// =============================================================================

pub const CHART_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        TRACKS_TABLE,
        TRACK_ARTISTS_TABLE,
        REGIONS_TABLE,
        GLOBAL_CHART_ENTRIES_TABLE,
        REGION_CHART_ENTRIES_TABLE,
    ],
}];

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn schema_creates_and_validates() {
        let conn = Connection::open_in_memory().unwrap();
        let schema = &CHART_VERSIONED_SCHEMAS[0];
        schema.create(&conn).unwrap();
        schema.validate(&conn).unwrap();
    }

    #[test]
    fn duplicate_entry_for_same_track_and_date_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        CHART_VERSIONED_SCHEMAS[0].create(&conn).unwrap();

        conn.execute(
            "INSERT INTO global_chart_entries (track_id, date, rank, streams)
             VALUES ('0VjIjW4GlUZAMYd2vXMi3b', '2021-01-01', 1, 41356421)",
            [],
        )
        .unwrap();

        let duplicate = conn.execute(
            "INSERT INTO global_chart_entries (track_id, date, rank, streams)
             VALUES ('0VjIjW4GlUZAMYd2vXMi3b', '2021-01-01', 2, 1)",
            [],
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn same_track_and_date_allowed_across_regions() {
        let conn = Connection::open_in_memory().unwrap();
        CHART_VERSIONED_SCHEMAS[0].create(&conn).unwrap();

        for region in ["Germany", "Japan"] {
            conn.execute(
                "INSERT INTO region_chart_entries (region_name, track_id, date, rank, streams)
                 VALUES (?1, '0VjIjW4GlUZAMYd2vXMi3b', '2021-01-01', 3, 100000)",
                [region],
            )
            .unwrap();
        }
    }
}
