use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use super::LoadSummary;
use crate::db::{Pool, TableWriter};
use crate::formats::DelimitedConfig;
use crate::formats::delimited::DelimitedReader;

/// Replace `target_table` with the full contents of a zone lookup CSV
pub async fn load_zone_data(pool: &Pool, target_table: &str, csv_path: &Path) -> Result<LoadSummary> {
    let start = Instant::now();
    info!(path = %csv_path.display(), table = %target_table, "loading zone data");

    let data = DelimitedReader::new(csv_path, DelimitedConfig::csv())
        .read_all()
        .await?;
    let rows = data
        .into_row_batch()
        .with_context(|| format!("Failed to convert {}", csv_path.display()))?;

    let writer = TableWriter::new(pool, target_table);
    writer.replace(&rows.schema).await?;
    let written = writer.append(&rows).await?;

    info!(table = %target_table, rows = written, "finished loading zone data");

    Ok(LoadSummary {
        table: target_table.to_string(),
        records_loaded: written,
        batches: 1,
        duration: start.elapsed(),
    })
}
