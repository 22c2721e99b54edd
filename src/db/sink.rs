//! Replace-then-append table writer.
//!
//! A destination table is first dropped and recreated from a schema, then populated with
//! multi-row INSERT statements. Nothing spans statements: a failure after some inserts
//! leaves the rows already written in place.

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use super::pool::Pool;
use super::schema::{Schema, generate_ddl, generate_drop, quote_ident};
use crate::config::{INSERT_CHUNK_SIZE, MAX_BIND_PARAMS};
use crate::formats::RowBatch;

/// Rows per INSERT statement for a table of `num_columns` columns
///
/// Capped both by the configured statement size and by the bind parameter limit.
pub fn rows_per_statement(num_columns: usize) -> usize {
    if num_columns == 0 {
        return INSERT_CHUNK_SIZE;
    }
    INSERT_CHUNK_SIZE.min(MAX_BIND_PARAMS / num_columns).max(1)
}

/// Build `INSERT INTO table (cols) VALUES ($1, $2), ($3, $4), ...` for `num_rows` rows
pub fn build_insert_sql(table_name: &str, schema: &Schema, num_rows: usize) -> String {
    let num_columns = schema.len();

    let column_list: Vec<String> = schema
        .columns
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect();

    let mut value_groups = Vec::with_capacity(num_rows);
    let mut param_idx = 1;
    for _ in 0..num_rows {
        let placeholders: Vec<String> = (0..num_columns)
            .map(|_| {
                let placeholder = format!("${}", param_idx);
                param_idx += 1;
                placeholder
            })
            .collect();
        value_groups.push(format!("({})", placeholders.join(", ")));
    }

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_ident(table_name),
        column_list.join(", "),
        value_groups.join(", ")
    )
}

/// Writes rows into one destination table
pub struct TableWriter<'a> {
    pool: &'a Pool,
    table_name: String,
}

impl<'a> TableWriter<'a> {
    pub fn new(pool: &'a Pool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
        }
    }

    /// Drop any existing table of this name and create it empty from `schema`
    pub async fn replace(&self, schema: &Schema) -> Result<()> {
        if schema.is_empty() {
            bail!(
                "Cannot create table '{}' without columns",
                self.table_name
            );
        }

        info!(table = %self.table_name, columns = schema.len(), "replacing table");

        self.pool
            .execute_query(&generate_drop(&self.table_name))
            .await
            .with_context(|| format!("Failed to drop table '{}'", self.table_name))?;

        self.pool
            .execute_query(&generate_ddl(&self.table_name, schema))
            .await
            .with_context(|| format!("Failed to create table '{}'", self.table_name))?;

        Ok(())
    }

    /// Append all rows of `batch`, splitting them across as many INSERT statements as needed
    ///
    /// Returns the number of rows written.
    pub async fn append(&self, batch: &RowBatch) -> Result<u64> {
        if batch.num_rows() == 0 {
            return Ok(0);
        }

        let chunk_rows = rows_per_statement(batch.schema.len());
        let mut rows_written = 0u64;

        for chunk in batch.records.chunks(chunk_rows) {
            let insert_sql = build_insert_sql(&self.table_name, &batch.schema, chunk.len());
            let affected = self
                .pool
                .insert_records(&insert_sql, chunk, &batch.schema)
                .await
                .with_context(|| {
                    format!(
                        "Failed to insert {} rows into '{}'",
                        chunk.len(),
                        self.table_name
                    )
                })?;

            debug!(table = %self.table_name, rows = chunk.len(), "inserted chunk");
            rows_written += affected;
        }

        Ok(rows_written)
    }
}
