use crate::chart_store::ChartEntry;
use chrono::NaiveDate;

/// Build the shared x-axis for a set of fetched entries: the distinct,
/// ascending calendar days on which at least one track in the requested set
/// charted. The axis spans the whole track set, not one track, so every
/// aligned series can be zipped against it positionally.
pub fn build_date_axis(entries: &[ChartEntry]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(track_id: &str, day: &str) -> ChartEntry {
        ChartEntry {
            track_id: track_id.to_string(),
            date: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            rank: 1,
            streams: 0,
        }
    }

    #[test]
    fn empty_input_yields_empty_axis() {
        assert!(build_date_axis(&[]).is_empty());
    }

    #[test]
    fn axis_is_sorted_and_deduplicated_across_tracks() {
        let entries = vec![
            entry("t2", "2021-01-02"),
            entry("t1", "2021-01-03"),
            entry("t1", "2021-01-01"),
            entry("t2", "2021-01-03"),
        ];
        let axis = build_date_axis(&entries);
        let days: Vec<String> = axis.iter().map(|d| d.to_string()).collect();
        assert_eq!(days, vec!["2021-01-01", "2021-01-02", "2021-01-03"]);
    }

    #[test]
    fn axis_is_strictly_ascending() {
        let entries = vec![
            entry("t1", "2020-12-31"),
            entry("t1", "2021-01-01"),
            entry("t2", "2020-12-31"),
        ];
        let axis = build_date_axis(&entries);
        assert!(axis.windows(2).all(|w| w[0] < w[1]));
    }
}
