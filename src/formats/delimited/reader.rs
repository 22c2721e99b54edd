use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use crate::config::CSV_NULL_TOKENS;
use crate::db::schema::{FieldValues, Schema, SchemaInferrer};
use crate::formats::reader::{DelimitedConfig, Record, RowBatch, Value};

/// Header and raw field values of a whole delimited file
#[derive(Debug, Clone)]
pub struct DelimitedData {
    pub header: Vec<String>,
    pub rows: Vec<FieldValues>,
}

impl DelimitedData {
    /// Infer column types and convert every row into typed records
    pub fn into_row_batch(self) -> Result<RowBatch> {
        let schema = SchemaInferrer::infer_from_data(&self.header, &self.rows);
        let records = typed_records(&schema, self.rows)?;
        Ok(RowBatch { schema, records })
    }
}

/// Reads a delimited file (CSV, TSV, ...) into memory in one go
pub struct DelimitedReader {
    path: PathBuf,
    config: DelimitedConfig,
}

impl DelimitedReader {
    pub fn new(path: impl AsRef<Path>, config: DelimitedConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
        }
    }

    /// Read and parse the whole file
    ///
    /// The first row is the header. Fields matching a null token come back as `None`.
    pub async fn read_all(&self) -> Result<DelimitedData> {
        let buffer = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        parse_delimited(&buffer, &self.config)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }
}

fn is_null_token(value: &str) -> bool {
    CSV_NULL_TOKENS.contains(&value.trim())
}

fn parse_delimited(buffer: &[u8], config: &DelimitedConfig) -> Result<DelimitedData> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .quote(config.quote)
        .flexible(true) // short rows are padded with NULLs by typed_records
        .from_reader(buffer);

    let header: Vec<String> = csv_reader
        .headers()
        .context("Failed to parse header row")?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV record {}", idx + 1))?;

        if record.len() > header.len() {
            bail!(
                "CSV record {} has {} fields, expected at most {}",
                idx + 1,
                record.len(),
                header.len()
            );
        }

        rows.push(
            record
                .iter()
                .map(|s| {
                    if is_null_token(s) {
                        None
                    } else {
                        Some(s.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(DelimitedData { header, rows })
}

/// Convert raw rows into records typed by `schema`
///
/// Short rows are padded with NULLs.
fn typed_records(schema: &Schema, rows: Vec<FieldValues>) -> Result<Vec<Record>> {
    rows.into_iter()
        .enumerate()
        .map(|(row_idx, mut row)| {
            row.resize(schema.len(), None);

            let fields = row
                .into_iter()
                .zip(&schema.columns)
                .map(|(raw, column)| match raw {
                    None => Ok(Value::Null),
                    Some(raw) => column.sql_type.parse_field(&raw).with_context(|| {
                        format!("Row {}, column '{}'", row_idx + 1, column.name)
                    }),
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(Record { fields })
        })
        .collect()
}
