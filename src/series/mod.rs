//! Chart series assembly.
//!
//! Turns sparse per-track chart entries into dense series aligned to a shared
//! date axis, the shape line-chart renderers consume directly: zip `date_axis`
//! with each track's `series`, treat `null` as a gap.

mod align;
mod assembler;
mod date_axis;

pub use align::align_to_axis;
pub use assembler::{SeriesAssembler, SeriesError, SeriesQuery, TrackSeries, TrackSeriesResponse};
pub use date_axis::build_date_axis;
