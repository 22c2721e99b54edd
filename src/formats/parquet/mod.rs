//! Parquet file format support.
//!
//! This module provides:
//! - A streaming reader that yields Arrow RecordBatches of bounded size
//! - Conversion from Arrow RecordBatches to typed row Records for insertion

mod conversion;
mod reader;

pub use conversion::record_batch_to_row_batch;
pub use reader::ParquetBatchReader;

#[cfg(test)]
pub(crate) use reader::tests::create_test_parquet_file;
