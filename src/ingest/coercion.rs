//! Best-effort column coercion on Arrow record batches.
//!
//! Casts are all-or-nothing per column: either every value converts and the column takes
//! the declared type, or the column is kept exactly as read. Datetime parsing is the
//! opposite, per value: unparseable cells become null.

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, Float64Array, new_null_array};
use arrow::compute::{CastOptions, cast_with_options};
use arrow::datatypes::{DataType, Field, Float64Type, Schema, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::sync::Arc;
use tracing::debug;

/// Declared semantic type of a source column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Nullable 64-bit integer
    Int64,
    Float64,
    Text,
}

impl ColumnType {
    pub fn data_type(self) -> DataType {
        match self {
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Text => DataType::Utf8,
        }
    }
}

/// Type that parsed datetime columns end up with
pub fn datetime_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, None)
}

/// Cast each present column named in `type_map` to its declared type
///
/// Columns missing from the batch are skipped; a column whose cast fails keeps its
/// original type and values.
pub fn coerce_columns(batch: &RecordBatch, type_map: &[(&str, ColumnType)]) -> Result<RecordBatch> {
    let mut columns = batch.columns().to_vec();
    let mut fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();

    for (name, column_type) in type_map {
        let Some((idx, _)) = batch.schema().column_with_name(name) else {
            continue;
        };

        let target = column_type.data_type();
        if fields[idx].data_type() == &target {
            continue;
        }

        match try_cast(&columns[idx], &target) {
            Some(cast) => {
                columns[idx] = cast;
                fields[idx] = fields[idx].clone().with_data_type(target).with_nullable(true);
            }
            None => {
                debug!(
                    column = %name,
                    from = ?fields[idx].data_type(),
                    to = ?target,
                    "cast failed, keeping original column"
                );
            }
        }
    }

    rebuild(batch, fields, columns)
}

/// Parse each present column named in `names` into a timestamp
///
/// Timestamps are left untouched, dates are widened, text is parsed value by value
/// with failures becoming null. Columns of any other type become all-null.
pub fn parse_datetime_columns(batch: &RecordBatch, names: &[&str]) -> Result<RecordBatch> {
    let mut columns = batch.columns().to_vec();
    let mut fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();

    for name in names {
        let Some((idx, _)) = batch.schema().column_with_name(name) else {
            continue;
        };

        let target = datetime_type();
        let parsed = match fields[idx].data_type() {
            DataType::Timestamp(_, _) => continue,
            DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Utf8View
            | DataType::Date32
            | DataType::Date64 => {
                cast_with_options(&columns[idx], &target, &CastOptions::default())
                    .unwrap_or_else(|_| new_null_array(&target, columns[idx].len()))
            }
            other => {
                debug!(column = %name, from = ?other, "not a datetime source type, nulling column");
                new_null_array(&target, columns[idx].len())
            }
        };

        columns[idx] = parsed;
        fields[idx] = fields[idx].clone().with_data_type(target).with_nullable(true);
    }

    rebuild(batch, fields, columns)
}

/// Strict cast, `None` if any value fails to convert
fn try_cast(array: &ArrayRef, target: &DataType) -> Option<ArrayRef> {
    let source = if target.is_integer() && array.data_type().is_floating() {
        integral_floats(array)?
    } else {
        array.clone()
    };

    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    cast_with_options(&source, target, &options).ok()
}

/// Floats with NaN turned into null, `None` if any remaining value has a fractional part
///
/// Float -> integer must be lossless, a plain cast would truncate 1.5 to 1.
fn integral_floats(array: &ArrayRef) -> Option<ArrayRef> {
    let floats = cast_with_options(array, &DataType::Float64, &CastOptions::default()).ok()?;
    let cleaned: Float64Array = floats
        .as_primitive::<Float64Type>()
        .iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();

    cleaned
        .iter()
        .flatten()
        .all(|v| v.fract() == 0.0)
        .then(|| Arc::new(cleaned) as ArrayRef)
}

fn rebuild(batch: &RecordBatch, fields: Vec<Field>, columns: Vec<ArrayRef>) -> Result<RecordBatch> {
    let schema = Schema::new_with_metadata(fields, batch.schema().metadata().clone());
    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));

    RecordBatch::try_new_with_options(Arc::new(schema), columns, &options)
        .context("Failed to rebuild record batch after coercion")
}
