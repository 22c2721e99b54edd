//! The two loaders: streamed trip records and the bulk zone lookup.

pub mod coercion;
pub mod trips;
pub mod zones;

use std::time::Duration;

pub use trips::load_trip_data;
pub use zones::load_zone_data;

/// Outcome of loading one destination table
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub table: String,
    pub records_loaded: u64,
    pub batches: usize,
    pub duration: Duration,
}
