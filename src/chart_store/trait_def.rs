//! ChartStore trait definition.
//!
//! This trait abstracts the chart query surface so the server and the series
//! assembler can work against `SqliteChartStore` or an in-memory test double.

use super::models::{ChartEntry, ChartScope, DailyChartRow, Region, Track, TrackSummary};
use anyhow::Result;
use chrono::NaiveDate;

pub trait ChartStore: Send + Sync {
    // =========================================================================
    // Chart Entry Queries
    // =========================================================================

    /// Get all chart entries for the given track-id set within the inclusive
    /// date bounds, ordered by date ascending.
    ///
    /// An empty track-id set yields an empty result, never an error. `None`
    /// bounds are open on that side.
    fn get_chart_entries(
        &self,
        scope: &ChartScope,
        track_ids: &[String],
        start_inclusive: Option<NaiveDate>,
        end_inclusive: Option<NaiveDate>,
    ) -> Result<Vec<ChartEntry>>;

    /// Get one day's full Top-50 table, ordered by rank ascending, with track
    /// names joined in where metadata exists.
    fn get_daily_chart(&self, scope: &ChartScope, date: NaiveDate) -> Result<Vec<DailyChartRow>>;

    // =========================================================================
    // Metadata Retrieval
    // =========================================================================

    /// Get a track's static metadata by ID.
    fn get_track(&self, id: &str) -> Result<Option<Track>>;

    /// List all tracks ordered by total stream count (global + regional)
    /// descending.
    fn list_tracks(&self) -> Result<Vec<TrackSummary>>;

    /// List all regions ordered by (geo_region asc, geo_subregion desc,
    /// name asc).
    fn list_regions(&self) -> Result<Vec<Region>>;

    // =========================================================================
    // Counts (for metrics and the stats endpoint)
    // =========================================================================

    fn get_tracks_count(&self) -> usize;
    fn get_regions_count(&self) -> usize;
    fn get_global_entries_count(&self) -> usize;
    fn get_region_entries_count(&self) -> usize;

    // =========================================================================
    // Write Operations (offline loading and test fixtures only)
    // =========================================================================

    /// Insert a track with its artists.
    fn insert_track(&self, track: &Track) -> Result<()>;

    /// Insert a region.
    fn insert_region(&self, region: &Region) -> Result<()>;

    /// Insert a batch of chart entries into one scope, transactionally.
    /// Rejects entries with a rank outside `1..=TOP_CHART_SIZE` and duplicate
    /// (scope, track, date) combinations.
    fn insert_chart_entries(&self, scope: &ChartScope, entries: &[ChartEntry]) -> Result<()>;
}
