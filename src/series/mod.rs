/// Input series
///
/// Row-ordered observation tables consumed by the volume profile calculator.
pub mod structs;

pub use structs::{ObservationTable, OhlcvCandle, TimestampMS, VOLUME_COLUMN};
