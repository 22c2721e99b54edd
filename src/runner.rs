//! High-level runner API for the taxi data ingest.
//!
//! Connects to the destination database and runs the two loaders in fixed order:
//! trip records first, then the zone lookup. This is the entry point used by the CLI.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::{
    DEFAULT_CHUNKSIZE, DEFAULT_PG_DB, DEFAULT_PG_HOST, DEFAULT_PG_PASS, DEFAULT_PG_PORT,
    DEFAULT_PG_USER, DEFAULT_TRIP_TABLE, DEFAULT_ZONE_TABLE, TRIP_DATA_PATH, ZONE_DATA_PATH,
};
use crate::db::{self, PoolArgsBuilder};
use crate::ingest::{load_trip_data, load_zone_data};

pub use crate::ingest::LoadSummary;

/// Arguments for running an ingest
#[derive(Debug, Clone)]
pub struct IngestArgs {
    // Connection configuration
    pub pg_user: String,
    pub pg_pass: String,
    pub pg_host: String,
    pub pg_port: u16,
    pub pg_db: String,

    // Destination tables
    pub trip_table: String,
    pub zone_table: String,

    /// Rows per trip batch
    pub chunksize: usize,

    // Source files
    pub trip_data_path: PathBuf,
    pub zone_data_path: PathBuf,

    pub quiet: bool,

    // Test-only: inject a pre-created pool (for SQLite testing)
    #[cfg(test)]
    pub test_pool: Option<crate::db::Pool>,
}

impl Default for IngestArgs {
    fn default() -> Self {
        Self {
            pg_user: DEFAULT_PG_USER.to_string(),
            pg_pass: DEFAULT_PG_PASS.to_string(),
            pg_host: DEFAULT_PG_HOST.to_string(),
            pg_port: DEFAULT_PG_PORT,
            pg_db: DEFAULT_PG_DB.to_string(),
            trip_table: DEFAULT_TRIP_TABLE.to_string(),
            zone_table: DEFAULT_ZONE_TABLE.to_string(),
            chunksize: DEFAULT_CHUNKSIZE,
            trip_data_path: PathBuf::from(TRIP_DATA_PATH),
            zone_data_path: PathBuf::from(ZONE_DATA_PATH),
            quiet: false,
            #[cfg(test)]
            test_pool: None,
        }
    }
}

/// Result of a completed ingest
#[derive(Debug)]
pub struct IngestResult {
    pub trips: LoadSummary,
    pub zones: LoadSummary,
    pub duration: Duration,
}

/// Load the trip file, then the zone file, into their destination tables
///
/// Any failure stops the run. Tables already written stay as they are.
///
/// # Example
///
/// ```no_run
/// use ny_taxi_ingest::runner::{IngestArgs, run_ingest};
///
/// # async fn example() -> anyhow::Result<()> {
/// let args = IngestArgs {
///     pg_host: "db.internal".to_string(),
///     chunksize: 50_000,
///     quiet: true,
///     ..IngestArgs::default()
/// };
///
/// let result = run_ingest(args).await?;
/// println!("Loaded {} trips in {:?}", result.trips.records_loaded, result.duration);
/// # Ok(())
/// # }
/// ```
pub async fn run_ingest(args: IngestArgs) -> Result<IngestResult> {
    let start = Instant::now();

    // Create connection pool (or use test pool if provided)
    #[cfg(test)]
    let pool = if let Some(test_pool) = args.test_pool.clone() {
        test_pool
    } else {
        connect(&args).await?
    };

    #[cfg(not(test))]
    let pool = connect(&args).await?;

    let trips = load_trip_data(
        &pool,
        &args.trip_table,
        args.chunksize,
        &args.trip_data_path,
        args.quiet,
    )
    .await
    .context("Trip data load failed")?;

    let zones = load_zone_data(&pool, &args.zone_table, &args.zone_data_path)
        .await
        .context("Zone data load failed")?;

    let duration = start.elapsed();
    info!(
        trips = trips.records_loaded,
        zones = zones.records_loaded,
        elapsed_ms = duration.as_millis() as u64,
        "ingest complete"
    );

    Ok(IngestResult {
        trips,
        zones,
        duration,
    })
}

async fn connect(args: &IngestArgs) -> Result<db::Pool> {
    let pool_args = PoolArgsBuilder::default()
        .username(&args.pg_user)
        .password(&args.pg_pass)
        .host(&args.pg_host)
        .port(args.pg_port)
        .database(&args.pg_db)
        .build()?;
    db::pool::pool(pool_args).await
}
