//! File format readers: streaming Parquet batches and whole-file CSV

pub mod delimited;
pub mod parquet;
pub mod reader;

pub use reader::{DelimitedConfig, Record, RowBatch, Value};
