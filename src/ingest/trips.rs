use anyhow::{Context, Result, bail};
use arrow::record_batch::RecordBatch;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use super::LoadSummary;
use super::coercion::{ColumnType, coerce_columns, parse_datetime_columns};
use crate::db::{Pool, Schema, TableWriter};
use crate::formats::parquet::{ParquetBatchReader, record_batch_to_row_batch};
use crate::telemetry::{LoadProgress, ProgressStats};

/// Declared types of the trip record columns, applied only to columns present in the file
pub const TRIP_COLUMN_TYPES: &[(&str, ColumnType)] = &[
    ("VendorID", ColumnType::Int64),
    ("passenger_count", ColumnType::Int64),
    ("trip_distance", ColumnType::Float64),
    ("RatecodeID", ColumnType::Int64),
    ("store_and_fwd_flag", ColumnType::Text),
    ("PULocationID", ColumnType::Int64),
    ("DOLocationID", ColumnType::Int64),
    ("payment_type", ColumnType::Int64),
    ("fare_amount", ColumnType::Float64),
    ("extra", ColumnType::Float64),
    ("mta_tax", ColumnType::Float64),
    ("tip_amount", ColumnType::Float64),
    ("tolls_amount", ColumnType::Float64),
    ("improvement_surcharge", ColumnType::Float64),
    ("total_amount", ColumnType::Float64),
    ("congestion_surcharge", ColumnType::Float64),
];

pub const TRIP_DATETIME_COLUMNS: &[&str] = &["lpep_pickup_datetime", "lpep_dropoff_datetime"];

/// Apply the trip type map and datetime parsing to one batch
pub fn prepare_trip_batch(batch: &RecordBatch) -> Result<RecordBatch> {
    let coerced = coerce_columns(batch, TRIP_COLUMN_TYPES)?;
    parse_datetime_columns(&coerced, TRIP_DATETIME_COLUMNS)
}

/// Stream a trip Parquet file into `target_table`, `chunksize` rows at a time
///
/// The table is dropped and recreated from the first batch's schema, then every batch is
/// appended. Nothing is rolled back if a later batch fails.
pub async fn load_trip_data(
    pool: &Pool,
    target_table: &str,
    chunksize: usize,
    parquet_path: &Path,
    quiet: bool,
) -> Result<LoadSummary> {
    if chunksize == 0 {
        bail!("chunksize must be greater than zero");
    }

    let start = Instant::now();
    let mut reader = ParquetBatchReader::open(parquet_path, chunksize).await?;
    info!(
        path = %parquet_path.display(),
        rows = reader.total_rows(),
        table = %target_table,
        chunksize,
        "loading trip data"
    );

    let writer = TableWriter::new(pool, target_table);
    let progress = LoadProgress::new("Trips", reader.total_rows(), quiet);
    let mut stats = ProgressStats::new();
    let mut table_created = false;

    while let Some(batch) = reader.next_batch().await? {
        let batch_start = Instant::now();
        let batch_idx = stats.batches_loaded;

        let prepared = prepare_trip_batch(&batch)
            .with_context(|| format!("Failed to prepare trip batch {}", batch_idx))?;
        let rows = record_batch_to_row_batch(&prepared)
            .with_context(|| format!("Failed to convert trip batch {}", batch_idx))?;

        if !table_created {
            writer.replace(&rows.schema).await?;
            table_created = true;
        }

        let written = writer
            .append(&rows)
            .await
            .with_context(|| format!("Failed to write trip batch {}", batch_idx))?;

        stats.record_batch(written, batch_start.elapsed().as_millis() as u64);
        progress.update(&stats);
        debug!(batch = batch_idx, rows = written, "inserted trip batch");
    }

    // No batches at all: still leave an empty table with the file's columns
    if !table_created {
        let empty = prepare_trip_batch(&RecordBatch::new_empty(reader.schema()))?;
        let schema = Schema::from_arrow(empty.schema().as_ref())?;
        writer.replace(&schema).await?;
    }

    progress.finish();

    let summary = LoadSummary {
        table: target_table.to_string(),
        records_loaded: stats.records_loaded,
        batches: stats.batches_loaded,
        duration: start.elapsed(),
    };

    if let (Some(p50), Some(p90), Some(p99)) = stats.get_percentiles() {
        info!(p50_ms = p50, p90_ms = p90, p99_ms = p99, "trip batch latency");
    }
    info!(
        table = %summary.table,
        rows = summary.records_loaded,
        batches = summary.batches,
        "finished loading trip data"
    );

    Ok(summary)
}
