pub mod resample;
pub mod snapshot;

pub use resample::{melt, series_points, LongPoint, ResampleExt, TIMESTAMP_COLUMN};
pub use snapshot::{snapshot, ColorClass, SnapshotColumns, StationPoint};
