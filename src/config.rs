//! Configuration constants for the ingest tool
//!
//! This module centralizes the file locations, CLI defaults and tunable limits used
//! throughout the application.

use std::time::Duration;

// ============================================================================
// Source Files
// ============================================================================

pub const TRIP_DATA_PATH: &str = "data/green_tripdata_2025-11.parquet";

pub const ZONE_DATA_PATH: &str = "data/taxi_zone_lookup.csv";

// ============================================================================
// CLI Defaults
// ============================================================================

pub const DEFAULT_PG_USER: &str = "postgres";
pub const DEFAULT_PG_PASS: &str = "postgres";
pub const DEFAULT_PG_HOST: &str = "localhost";
pub const DEFAULT_PG_PORT: u16 = 5433;
pub const DEFAULT_PG_DB: &str = "ny_taxi";
pub const DEFAULT_TRIP_TABLE: &str = "green_trip_data";
pub const DEFAULT_ZONE_TABLE: &str = "zones";
pub const DEFAULT_CHUNKSIZE: usize = 100_000;

// ============================================================================
// Connection Configuration
// ============================================================================

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a single INSERT statement
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(180);

// ============================================================================
// Write Configuration
// ============================================================================

/// Rows per multi-row INSERT statement
pub const INSERT_CHUNK_SIZE: usize = 10_000;

/// Upper bound on bind parameters in one statement (PostgreSQL protocol uses a u16 count)
pub const MAX_BIND_PARAMS: usize = 65_535;

// ============================================================================
// CSV Configuration
// ============================================================================

/// Field values read as NULL from delimited files, matching the usual dataframe defaults
pub const CSV_NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];
