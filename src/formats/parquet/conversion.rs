//! Conversion from Arrow RecordBatch to typed row Records.
//!
//! Arrow's columnar layout is transposed into rows of `Value` cells, each column mapped
//! to the SQL type it will be stored as. Nulls stay `Value::Null`; binary columns are
//! hex-encoded text; decimals become doubles.

use anyhow::{Context, Result, anyhow};
use arrow::array::*;
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Decimal128Type, Float32Type, Float64Type, Int8Type, Int16Type,
    Int32Type, Int64Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use arrow::record_batch::RecordBatch;
use arrow::temporal_conversions::{
    date32_to_datetime, date64_to_datetime, timestamp_ms_to_datetime, timestamp_ns_to_datetime,
    timestamp_s_to_datetime, timestamp_us_to_datetime,
};
use chrono::NaiveDateTime;

use crate::db::schema::Schema;
use crate::formats::reader::{Record, RowBatch, Value};

/// Convert an Arrow RecordBatch into typed records plus the matching table schema
pub fn record_batch_to_row_batch(batch: &RecordBatch) -> Result<RowBatch> {
    let schema = Schema::from_arrow(batch.schema().as_ref())?;
    let num_rows = batch.num_rows();

    // Convert each column, then transpose to rows
    let mut columns = Vec::with_capacity(batch.num_columns());
    for (col_idx, array) in batch.columns().iter().enumerate() {
        let values = array_to_values(array.as_ref()).with_context(|| {
            format!(
                "Failed to convert column '{}' ({:?})",
                batch.schema().field(col_idx).name(),
                array.data_type()
            )
        })?;
        columns.push(values.into_iter());
    }

    let records = (0..num_rows)
        .map(|_| Record {
            fields: columns
                .iter_mut()
                .map(|col| col.next().unwrap_or(Value::Null))
                .collect(),
        })
        .collect();

    Ok(RowBatch { schema, records })
}

/// Convert an Arrow array to a vector of cell values
fn array_to_values(array: &dyn Array) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(array.len());

    match array.data_type() {
        DataType::Null => values.resize(array.len(), Value::Null),
        DataType::Boolean => {
            values.extend(
                array
                    .as_boolean()
                    .iter()
                    .map(|v| v.map(Value::Bool).unwrap_or(Value::Null)),
            );
        }
        DataType::Int8 => convert_primitive::<Int8Type>(array, &mut values, |v| Ok(Value::Int(v.into())))?,
        DataType::Int16 => convert_primitive::<Int16Type>(array, &mut values, |v| Ok(Value::Int(v.into())))?,
        DataType::Int32 => convert_primitive::<Int32Type>(array, &mut values, |v| Ok(Value::Int(v.into())))?,
        DataType::Int64 => convert_primitive::<Int64Type>(array, &mut values, |v| Ok(Value::Int(v)))?,
        DataType::UInt8 => convert_primitive::<UInt8Type>(array, &mut values, |v| Ok(Value::Int(v.into())))?,
        DataType::UInt16 => convert_primitive::<UInt16Type>(array, &mut values, |v| Ok(Value::Int(v.into())))?,
        DataType::UInt32 => convert_primitive::<UInt32Type>(array, &mut values, |v| Ok(Value::Int(v.into())))?,
        DataType::UInt64 => convert_primitive::<UInt64Type>(array, &mut values, |v| {
            i64::try_from(v)
                .map(Value::Int)
                .map_err(|_| anyhow!("Value {} does not fit in BIGINT", v))
        })?,
        DataType::Float32 => convert_primitive::<Float32Type>(array, &mut values, |v| Ok(Value::Float(v.into())))?,
        DataType::Float64 => convert_primitive::<Float64Type>(array, &mut values, |v| Ok(Value::Float(v)))?,
        DataType::Utf8 => push_strings(array.as_string::<i32>().iter(), &mut values),
        DataType::LargeUtf8 => push_strings(array.as_string::<i64>().iter(), &mut values),
        DataType::Utf8View => push_strings(array.as_string_view().iter(), &mut values),
        DataType::Binary => {
            values.extend(
                array
                    .as_binary::<i32>()
                    .iter()
                    .map(|v| v.map(|b| Value::Text(hex::encode(b))).unwrap_or(Value::Null)),
            );
        }
        DataType::LargeBinary => {
            values.extend(
                array
                    .as_binary::<i64>()
                    .iter()
                    .map(|v| v.map(|b| Value::Text(hex::encode(b))).unwrap_or(Value::Null)),
            );
        }
        DataType::Date32 => {
            for v in array.as_primitive::<arrow::datatypes::Date32Type>().iter() {
                values.push(match v {
                    Some(days) => Value::Date(date32_to_datetime(days).context("Invalid date")?.date()),
                    None => Value::Null,
                });
            }
        }
        DataType::Date64 => {
            for v in array.as_primitive::<arrow::datatypes::Date64Type>().iter() {
                values.push(match v {
                    Some(millis) => {
                        Value::Date(date64_to_datetime(millis).context("Invalid date")?.date())
                    }
                    None => Value::Null,
                });
            }
        }
        DataType::Timestamp(unit, tz) => {
            let with_tz = tz.is_some();
            let to_value = move |naive: NaiveDateTime| {
                if with_tz {
                    Value::TimestampTz(naive.and_utc())
                } else {
                    Value::Timestamp(naive)
                }
            };
            convert_timestamp(array, unit, &mut values, to_value)?;
        }
        DataType::Decimal128(_, scale) => {
            let scale = *scale;
            convert_primitive::<Decimal128Type>(array, &mut values, |v| {
                let formatted = format_decimal128(v, scale);
                formatted
                    .parse()
                    .map(Value::Float)
                    .with_context(|| format!("Invalid decimal '{}'", formatted))
            })?;
        }
        _ => {
            return Err(anyhow!(
                "Unsupported array type for conversion: {:?}",
                array.data_type()
            ));
        }
    }

    Ok(values)
}

fn push_strings<'a>(iter: impl Iterator<Item = Option<&'a str>>, values: &mut Vec<Value>) {
    values.extend(iter.map(|v| v.map(|s| Value::Text(s.to_string())).unwrap_or(Value::Null)));
}

/// Helper to convert primitive arrays
fn convert_primitive<T: ArrowPrimitiveType>(
    array: &dyn Array,
    values: &mut Vec<Value>,
    to_value: impl Fn(T::Native) -> Result<Value>,
) -> Result<()> {
    for v in array.as_primitive::<T>().iter() {
        values.push(match v {
            Some(v) => to_value(v)?,
            None => Value::Null,
        });
    }
    Ok(())
}

/// Convert timestamp arrays of any unit
fn convert_timestamp(
    array: &dyn Array,
    unit: &TimeUnit,
    values: &mut Vec<Value>,
    to_value: impl Fn(NaiveDateTime) -> Value,
) -> Result<()> {
    let convert = |raw: i64, naive: Option<NaiveDateTime>| -> Result<Value> {
        naive
            .map(&to_value)
            .ok_or_else(|| anyhow!("Invalid timestamp {}", raw))
    };

    match unit {
        TimeUnit::Second => convert_primitive::<TimestampSecondType>(array, values, |v| {
            convert(v, timestamp_s_to_datetime(v))
        }),
        TimeUnit::Millisecond => convert_primitive::<TimestampMillisecondType>(array, values, |v| {
            convert(v, timestamp_ms_to_datetime(v))
        }),
        TimeUnit::Microsecond => convert_primitive::<TimestampMicrosecondType>(array, values, |v| {
            convert(v, timestamp_us_to_datetime(v))
        }),
        TimeUnit::Nanosecond => convert_primitive::<TimestampNanosecondType>(array, values, |v| {
            convert(v, timestamp_ns_to_datetime(v))
        }),
    }
}

/// Format a Decimal128 value with the given scale
fn format_decimal128(value: i128, scale: i8) -> String {
    if scale <= 0 {
        return (value * 10_i128.pow(scale.unsigned_abs() as u32)).to_string();
    }

    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    let divisor = 10_u128.pow(scale as u32);

    format!(
        "{}{}.{:0width$}",
        sign,
        abs / divisor,
        abs % divisor,
        width = scale as usize
    )
}
