//! Chart store models.
//!
//! Chart entries exist in two structurally identical datasets: the global
//! Top-50 chart and the per-country Top-50 charts. Which one a query hits is
//! decided once, up front, by resolving a `ChartScope`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Highest rank a chart entry can have. Entries only exist for days a track
/// actually charted, so rank is always in `1..=TOP_CHART_SIZE`.
pub const TOP_CHART_SIZE: u32 = 50;

/// The dataset a chart query is routed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChartScope {
    Global,
    Region(String),
}

impl ChartScope {
    /// Resolve the scope from a request's optional region string.
    ///
    /// Absent or the literal `"Global"` routes to the global chart; any other
    /// value names a country chart. Matching is exact and case-sensitive, the
    /// upstream clients only ever send region names from the regions listing.
    pub fn resolve(region: Option<&str>) -> Self {
        match region {
            None | Some("Global") => ChartScope::Global,
            Some(name) => ChartScope::Region(name.to_string()),
        }
    }
}

/// One day's ranking record for a track within a scope.
///
/// Immutable once written. Unique per (scope, track, date).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub track_id: String,
    pub date: NaiveDate,
    pub rank: u32,
    pub streams: u64,
}

/// Numeric audio features from the Spotify analysis, static per track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: f64,
}

/// Static track metadata. Read-only at serve time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Artist names in billing order.
    pub artists: Vec<String>,
    #[serde(flatten)]
    pub features: AudioFeatures,
}

/// A country that has its own Top-50 chart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub iso_alpha2: String,
    pub iso_alpha3: String,
    pub geo_region: String,
    pub geo_subregion: String,
}

/// Compact track row for client-side pickers, ordered by total streams.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub total_streams: u64,
}

/// One row of a single day's Top-50 table, joined with the track name.
///
/// `track_name` is `None` when the entry references a track with no metadata
/// row; the chart data and the track dump were collected independently.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyChartRow {
    pub rank: u32,
    pub track_id: String,
    pub track_name: Option<String>,
    pub streams: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_resolution() {
        assert_eq!(ChartScope::resolve(None), ChartScope::Global);
        assert_eq!(ChartScope::resolve(Some("Global")), ChartScope::Global);
        assert_eq!(
            ChartScope::resolve(Some("Germany")),
            ChartScope::Region("Germany".to_string())
        );
        // Case-sensitive: only the exact literal routes to the global chart
        assert_eq!(
            ChartScope::resolve(Some("global")),
            ChartScope::Region("global".to_string())
        );
    }
}
