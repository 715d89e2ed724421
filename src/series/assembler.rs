use super::align::align_to_axis;
use super::date_axis::build_date_axis;
use crate::chart_store::{ChartEntry, ChartScope, ChartStore, Track};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("chart store query failed: {0}")]
    Store(#[from] anyhow::Error),
}

/// Filter for a series request.
///
/// `region` absent or `"Global"` selects the global chart. Date bounds are
/// inclusive and optional; a start after the end is not rejected, it simply
/// matches nothing.
#[derive(Clone, Debug, Deserialize)]
pub struct SeriesQuery {
    pub track_ids: Vec<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub start_inclusive: Option<NaiveDate>,
    #[serde(default)]
    pub end_inclusive: Option<NaiveDate>,
}

/// One track's metadata plus its series aligned to the shared date axis.
#[derive(Debug, Serialize)]
pub struct TrackSeries {
    #[serde(flatten)]
    pub track: Track,
    pub series: Vec<Option<ChartEntry>>,
}

/// The assembled response: `series[i]` of every track corresponds to
/// `date_axis[i]`.
#[derive(Debug, Serialize)]
pub struct TrackSeriesResponse {
    pub tracks: Vec<TrackSeries>,
    pub date_axis: Vec<NaiveDate>,
}

/// Composes the entry store, date axis builder and per-track alignment into
/// the chart-ready response shape. Stateless apart from the store handle;
/// every request computes fresh, nothing is cached.
pub struct SeriesAssembler {
    store: Arc<dyn ChartStore>,
}

impl SeriesAssembler {
    pub fn new(store: Arc<dyn ChartStore>) -> Self {
        SeriesAssembler { store }
    }

    pub fn assemble(&self, query: &SeriesQuery) -> Result<TrackSeriesResponse, SeriesError> {
        if query.track_ids.is_empty() {
            return Ok(TrackSeriesResponse {
                tracks: Vec::new(),
                date_axis: Vec::new(),
            });
        }

        let scope = ChartScope::resolve(query.region.as_deref());
        let entries = self.store.get_chart_entries(
            &scope,
            &query.track_ids,
            query.start_inclusive,
            query.end_inclusive,
        )?;

        let date_axis = build_date_axis(&entries);

        let mut grouped: HashMap<String, Vec<ChartEntry>> = HashMap::new();
        for entry in entries {
            grouped.entry(entry.track_id.clone()).or_default().push(entry);
        }

        // Request order keeps the response deterministic. Tracks that did not
        // chart in the window are omitted, as are ids with no metadata row.
        let mut tracks = Vec::new();
        for id in &query.track_ids {
            let Some(track_entries) = grouped.remove(id) else {
                continue;
            };
            let Some(track) = self.store.get_track(id)? else {
                continue;
            };
            tracks.push(TrackSeries {
                track,
                series: align_to_axis(track_entries, &date_axis),
            });
        }

        Ok(TrackSeriesResponse { tracks, date_axis })
    }
}
