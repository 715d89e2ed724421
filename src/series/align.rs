use crate::chart_store::ChartEntry;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Map one track's sparse entries onto the shared date axis.
///
/// Position `i` of the result holds the entry for `axis[i]` if the track
/// charted that day, else `None`. The result always has the exact length of
/// the axis. Absence stays absence: no interpolation, no carry-forward of the
/// previous rank, so gaps render as genuine breaks in the line.
pub fn align_to_axis(entries: Vec<ChartEntry>, axis: &[NaiveDate]) -> Vec<Option<ChartEntry>> {
    let mut by_date: HashMap<NaiveDate, ChartEntry> =
        entries.into_iter().map(|e| (e.date, e)).collect();
    axis.iter().map(|date| by_date.remove(date)).collect()
}
