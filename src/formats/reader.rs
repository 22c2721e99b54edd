use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::db::schema::Schema;

/// A single typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

/// A single record (row) from the source
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub fields: Vec<Value>,
}

/// Records together with the schema describing their columns
#[derive(Debug, Clone)]
pub struct RowBatch {
    pub schema: Schema,
    pub records: Vec<Record>,
}

impl RowBatch {
    pub fn num_rows(&self) -> usize {
        self.records.len()
    }
}

/// Configuration for delimited file reading (CSV, TSV, etc.), always with a header row
#[derive(Debug, Clone)]
pub struct DelimitedConfig {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for DelimitedConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl DelimitedConfig {
    pub fn csv() -> Self {
        Self::default()
    }
}
