use clap::Parser;
use ny_taxi_ingest::config::{
    DEFAULT_CHUNKSIZE, DEFAULT_PG_DB, DEFAULT_PG_HOST, DEFAULT_PG_PASS, DEFAULT_PG_PORT,
    DEFAULT_PG_USER, DEFAULT_TRIP_TABLE, DEFAULT_ZONE_TABLE, TRIP_DATA_PATH, ZONE_DATA_PATH,
};
use ny_taxi_ingest::runner::{IngestArgs, run_ingest};
use std::path::PathBuf;

/// Load NYC green taxi trips and the taxi zone lookup into PostgreSQL
#[derive(Parser, Clone)]
#[command(version)]
struct Args {
    /// PostgreSQL user
    #[arg(long, default_value = DEFAULT_PG_USER)]
    pg_user: String,

    /// PostgreSQL password
    #[arg(long, default_value = DEFAULT_PG_PASS)]
    pg_pass: String,

    /// PostgreSQL host
    #[arg(long, default_value = DEFAULT_PG_HOST)]
    pg_host: String,

    /// PostgreSQL port
    #[arg(long, default_value_t = DEFAULT_PG_PORT)]
    pg_port: u16,

    /// PostgreSQL database name
    #[arg(long, default_value = DEFAULT_PG_DB)]
    pg_db: String,

    /// Target table for trip records
    #[arg(long, default_value = DEFAULT_TRIP_TABLE)]
    trip_table: String,

    /// Target table for the zone lookup
    #[arg(long, default_value = DEFAULT_ZONE_TABLE)]
    zone_table: String,

    /// Rows per trip batch
    #[arg(long, default_value_t = DEFAULT_CHUNKSIZE)]
    chunksize: usize,

    /// Suppress progress output and info logs
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing based on quiet mode
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = if args.quiet {
        EnvFilter::new("ny_taxi_ingest=warn,sqlx=off")
    } else {
        EnvFilter::new("ny_taxi_ingest=info,sqlx=off")
    };
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    if !args.quiet {
        println!("NYC Taxi Ingest");
        println!("===============");
        println!(
            "Database: {}:{}/{}",
            args.pg_host, args.pg_port, args.pg_db
        );
        println!("Trips: {} -> {}", TRIP_DATA_PATH, args.trip_table);
        println!("Zones: {} -> {}", ZONE_DATA_PATH, args.zone_table);
        println!("Chunksize: {}", args.chunksize);
        println!();
    }

    let ingest_args = IngestArgs {
        pg_user: args.pg_user,
        pg_pass: args.pg_pass,
        pg_host: args.pg_host,
        pg_port: args.pg_port,
        pg_db: args.pg_db,
        trip_table: args.trip_table,
        zone_table: args.zone_table,
        chunksize: args.chunksize,
        trip_data_path: PathBuf::from(TRIP_DATA_PATH),
        zone_data_path: PathBuf::from(ZONE_DATA_PATH),
        quiet: args.quiet,
    };

    let result = run_ingest(ingest_args).await?;

    if !args.quiet {
        println!();
        println!("Load Summary");
        println!("============");
        for summary in [&result.trips, &result.zones] {
            println!(
                "{}: {} rows in {:.2}s",
                summary.table,
                summary.records_loaded,
                summary.duration.as_secs_f64()
            );
        }
        println!("Trip batches: {}", result.trips.batches);
        println!("Duration: {:.2}s", result.duration.as_secs_f64());
    }

    Ok(())
}
