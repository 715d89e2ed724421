//! SQLite-backed chart store implementation.

use super::models::*;
use super::schema::CHART_VERSIONED_SCHEMAS;
use super::trait_def::ChartStore;
use crate::server::metrics::record_db_query;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::info;

/// SQLite-backed chart store.
///
/// Reads round-robin over a small pool of read-only connections; writes go
/// through a single guarded connection. Chart data is written once (offline
/// loading, test fixtures) and never mutated afterwards.
#[derive(Clone)]
pub struct SqliteChartStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let latest_schema = &CHART_VERSIONED_SCHEMAS[CHART_VERSIONED_SCHEMAS.len() - 1];

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if table_count == 0 {
        info!("Creating chart db schema at version {}", latest_schema.version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let current_version = db_version - BASE_DB_VERSION as i64;
    if current_version != latest_schema.version as i64 {
        bail!(
            "Unsupported chart db schema version {} (expected {})",
            current_version,
            latest_schema.version
        );
    }

    latest_schema.validate(conn)
}

fn parse_date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl SqliteChartStore {
    /// Open (or create) a chart database.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of connections for concurrent read operations
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open chart database")?;

        migrate_if_needed(&mut write_conn)?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let track_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))
            .unwrap_or(0);
        let global_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM global_chart_entries", [], |r| r.get(0))
            .unwrap_or(0);
        let region_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM region_chart_entries", [], |r| r.get(0))
            .unwrap_or(0);

        info!(
            "Opened chart db: {} tracks, {} global entries, {} region entries",
            track_count, global_count, region_count
        );

        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteChartStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn count(&self, sql: &str) -> usize {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        conn.query_row(sql, [], |r| r.get::<_, i64>(0))
            .map(|c| c as usize)
            .unwrap_or(0)
    }

    /// Parse a ChartEntry from a (track_id, date, rank, streams) row.
    fn parse_entry_row(row: &rusqlite::Row) -> rusqlite::Result<ChartEntry> {
        Ok(ChartEntry {
            track_id: row.get(0)?,
            date: parse_date_column(row, 1)?,
            rank: row.get::<_, i64>(2)? as u32,
            streams: row.get::<_, i64>(3)? as u64,
        })
    }

    /// Get artist names for a track by rowid, in billing order.
    fn get_track_artists(conn: &Connection, track_rowid: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare_cached(
            "SELECT name FROM track_artists WHERE track_rowid = ?1 ORDER BY position ASC",
        )?;
        let artists = stmt
            .query_map(params![track_rowid], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(artists)
    }
}

impl ChartStore for SqliteChartStore {
    fn get_chart_entries(
        &self,
        scope: &ChartScope,
        track_ids: &[String],
        start_inclusive: Option<NaiveDate>,
        end_inclusive: Option<NaiveDate>,
    ) -> Result<Vec<ChartEntry>> {
        // An empty IN () is a SQL syntax error, and the contract wants an
        // empty result here anyway.
        if track_ids.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();

        let placeholders = vec!["?"; track_ids.len()].join(", ");
        let mut bindings: Vec<String> = track_ids.to_vec();
        let mut sql = match scope {
            ChartScope::Global => format!(
                "SELECT track_id, date, rank, streams FROM global_chart_entries \
                 WHERE track_id IN ({placeholders})"
            ),
            ChartScope::Region(name) => {
                bindings.insert(0, name.clone());
                format!(
                    "SELECT track_id, date, rank, streams FROM region_chart_entries \
                     WHERE region_name = ? AND track_id IN ({placeholders})"
                )
            }
        };
        if let Some(start) = start_inclusive {
            sql.push_str(" AND date >= ?");
            bindings.push(start.to_string());
        }
        if let Some(end) = end_inclusive {
            sql.push_str(" AND date <= ?");
            bindings.push(end.to_string());
        }
        sql.push_str(" ORDER BY date ASC");

        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(rusqlite::params_from_iter(bindings.iter()), Self::parse_entry_row)?
            .collect::<Result<Vec<_>, _>>()?;

        record_db_query("chart_entries", started.elapsed());
        Ok(entries)
    }

    fn get_daily_chart(&self, scope: &ChartScope, date: NaiveDate) -> Result<Vec<DailyChartRow>> {
        let started = Instant::now();
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();

        let (sql, bindings) = match scope {
            ChartScope::Global => (
                "SELECT e.rank, e.track_id, t.name, e.streams \
                 FROM global_chart_entries e LEFT JOIN tracks t ON t.id = e.track_id \
                 WHERE e.date = ?1 ORDER BY e.rank ASC",
                vec![date.to_string()],
            ),
            ChartScope::Region(name) => (
                "SELECT e.rank, e.track_id, t.name, e.streams \
                 FROM region_chart_entries e LEFT JOIN tracks t ON t.id = e.track_id \
                 WHERE e.region_name = ?1 AND e.date = ?2 ORDER BY e.rank ASC",
                vec![name.clone(), date.to_string()],
            ),
        };

        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
                Ok(DailyChartRow {
                    rank: row.get::<_, i64>(0)? as u32,
                    track_id: row.get(1)?,
                    track_name: row.get(2)?,
                    streams: row.get::<_, i64>(3)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        record_db_query("daily_chart", started.elapsed());
        Ok(rows)
    }

    fn get_track(&self, id: &str) -> Result<Option<Track>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();

        let row = conn.query_row(
            "SELECT rowid, id, name, danceability, energy, loudness, speechiness, \
                    acousticness, instrumentalness, liveness, valence, tempo, duration_ms \
             FROM tracks WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    AudioFeatures {
                        danceability: row.get(3)?,
                        energy: row.get(4)?,
                        loudness: row.get(5)?,
                        speechiness: row.get(6)?,
                        acousticness: row.get(7)?,
                        instrumentalness: row.get(8)?,
                        liveness: row.get(9)?,
                        valence: row.get(10)?,
                        tempo: row.get(11)?,
                        duration_ms: row.get(12)?,
                    },
                ))
            },
        );

        let (rowid, id, name, features) = match row {
            Ok(parsed) => parsed,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let artists = Self::get_track_artists(&conn, rowid)?;
        Ok(Some(Track {
            id,
            name,
            artists,
            features,
        }))
    }

    fn list_tracks(&self) -> Result<Vec<TrackSummary>> {
        let started = Instant::now();
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();

        let mut stmt = conn.prepare_cached(
            "SELECT t.rowid, t.id, t.name, \
                    COALESCE((SELECT SUM(streams) FROM global_chart_entries g WHERE g.track_id = t.id), 0) + \
                    COALESCE((SELECT SUM(streams) FROM region_chart_entries r WHERE r.track_id = t.id), 0) \
                    AS total_streams \
             FROM tracks t ORDER BY total_streams DESC, t.name ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)? as u64,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut tracks = Vec::with_capacity(rows.len());
        for (rowid, id, name, total_streams) in rows {
            let artists = Self::get_track_artists(&conn, rowid)?;
            tracks.push(TrackSummary {
                id,
                name,
                artists,
                total_streams,
            });
        }

        record_db_query("list_tracks", started.elapsed());
        Ok(tracks)
    }

    fn list_regions(&self) -> Result<Vec<Region>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();

        let mut stmt = conn.prepare_cached(
            "SELECT name, iso_alpha2, iso_alpha3, geo_region, geo_subregion \
             FROM regions ORDER BY geo_region ASC, geo_subregion DESC, name ASC",
        )?;
        let regions = stmt
            .query_map([], |row| {
                Ok(Region {
                    name: row.get(0)?,
                    iso_alpha2: row.get(1)?,
                    iso_alpha3: row.get(2)?,
                    geo_region: row.get(3)?,
                    geo_subregion: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(regions)
    }

    fn get_tracks_count(&self) -> usize {
        self.count("SELECT COUNT(*) FROM tracks")
    }

    fn get_regions_count(&self) -> usize {
        self.count("SELECT COUNT(*) FROM regions")
    }

    fn get_global_entries_count(&self) -> usize {
        self.count("SELECT COUNT(*) FROM global_chart_entries")
    }

    fn get_region_entries_count(&self) -> usize {
        self.count("SELECT COUNT(*) FROM region_chart_entries")
    }

    fn insert_track(&self, track: &Track) -> Result<()> {
        let mut conn = self.write_conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO tracks (id, name, danceability, energy, loudness, speechiness, \
                                 acousticness, instrumentalness, liveness, valence, tempo, duration_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                track.id,
                track.name,
                track.features.danceability,
                track.features.energy,
                track.features.loudness,
                track.features.speechiness,
                track.features.acousticness,
                track.features.instrumentalness,
                track.features.liveness,
                track.features.valence,
                track.features.tempo,
                track.features.duration_ms,
            ],
        )?;
        let track_rowid = tx.last_insert_rowid();
        for (position, artist) in track.artists.iter().enumerate() {
            tx.execute(
                "INSERT INTO track_artists (track_rowid, name, position) VALUES (?1, ?2, ?3)",
                params![track_rowid, artist, position as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn insert_region(&self, region: &Region) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO regions (name, iso_alpha2, iso_alpha3, geo_region, geo_subregion) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                region.name,
                region.iso_alpha2,
                region.iso_alpha3,
                region.geo_region,
                region.geo_subregion,
            ],
        )?;
        Ok(())
    }

    fn insert_chart_entries(&self, scope: &ChartScope, entries: &[ChartEntry]) -> Result<()> {
        for entry in entries {
            if entry.rank < 1 || entry.rank > TOP_CHART_SIZE {
                bail!(
                    "Chart entry rank {} for track {} on {} is outside 1..={}",
                    entry.rank,
                    entry.track_id,
                    entry.date,
                    TOP_CHART_SIZE
                );
            }
        }

        let mut conn = self.write_conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            match scope {
                ChartScope::Global => {
                    let mut stmt = tx.prepare_cached(
                        "INSERT INTO global_chart_entries (track_id, date, rank, streams) \
                         VALUES (?1, ?2, ?3, ?4)",
                    )?;
                    for entry in entries {
                        stmt.execute(params![
                            entry.track_id,
                            entry.date.to_string(),
                            entry.rank,
                            entry.streams as i64,
                        ])?;
                    }
                }
                ChartScope::Region(name) => {
                    let mut stmt = tx.prepare_cached(
                        "INSERT INTO region_chart_entries (region_name, track_id, date, rank, streams) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                    )?;
                    for entry in entries {
                        stmt.execute(params![
                            name,
                            entry.track_id,
                            entry.date.to_string(),
                            entry.rank,
                            entry.streams as i64,
                        ])?;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
