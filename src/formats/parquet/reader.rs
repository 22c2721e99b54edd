//! Streaming Parquet reader yielding bounded-size Arrow record batches.

use anyhow::{Context, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use parquet::arrow::async_reader::ParquetRecordBatchStreamBuilder;
use parquet::errors::ParquetError;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Reads a local Parquet file as a sequence of record batches of at most `batch_size` rows
///
/// Batches never span row groups, so a batch may be shorter than `batch_size` even
/// before the end of the file.
pub struct ParquetBatchReader {
    path: PathBuf,
    schema: SchemaRef,
    total_rows: u64,
    stream: BoxStream<'static, Result<RecordBatch, ParquetError>>,
}

impl ParquetBatchReader {
    /// Open the file and read its footer metadata
    pub async fn open(path: impl AsRef<Path>, batch_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = File::open(&path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let builder = ParquetRecordBatchStreamBuilder::new(file)
            .await
            .with_context(|| format!("Failed to read Parquet metadata from {}", path.display()))?;

        let total_rows = builder.metadata().file_metadata().num_rows().max(0) as u64;
        let schema = builder.schema().clone();

        let stream = builder
            .with_batch_size(batch_size)
            .build()
            .context("Failed to build Parquet stream")?
            .boxed();

        Ok(Self {
            path,
            schema,
            total_rows,
            stream,
        })
    }

    /// Arrow schema of the file
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Row count recorded in the file footer
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Read the next batch, or `None` at end of file
    pub async fn next_batch(&mut self) -> Result<Option<RecordBatch>> {
        self.stream
            .try_next()
            .await
            .with_context(|| format!("Failed to read record batch from {}", self.path.display()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int32Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::ArrowWriter;
    use parquet::file::properties::WriterProperties;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    /// Helper to create a test Parquet file
    pub(crate) fn create_test_parquet_file(num_rows: usize, row_group_size: usize) -> NamedTempFile {
        let temp_file = NamedTempFile::new().unwrap();

        let schema = Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("value", DataType::Float64, true),
        ]);

        let props = WriterProperties::builder()
            .set_max_row_group_size(row_group_size)
            .build();

        let file = std::fs::File::create(temp_file.path()).unwrap();
        let mut writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props)).unwrap();

        // Write data in batches
        let batch_size = 100;
        for start in (0..num_rows).step_by(batch_size) {
            let end = std::cmp::min(start + batch_size, num_rows);

            let id_array = Int32Array::from_iter_values(start as i32..end as i32);
            let name_array =
                StringArray::from_iter_values((start..end).map(|i| format!("name_{}", i)));
            let value_array = Float64Array::from_iter_values((start..end).map(|i| i as f64 * 1.5));

            let batch = RecordBatch::try_new(
                Arc::new(schema.clone()),
                vec![
                    Arc::new(id_array),
                    Arc::new(name_array),
                    Arc::new(value_array),
                ],
            )
            .unwrap();

            writer.write(&batch).unwrap();
        }

        writer.close().unwrap();
        temp_file
    }

    async fn collect_batch_sizes(reader: &mut ParquetBatchReader) -> Vec<usize> {
        let mut sizes = Vec::new();
        while let Some(batch) = reader.next_batch().await.unwrap() {
            sizes.push(batch.num_rows());
        }
        sizes
    }

    #[tokio::test]
    async fn test_parquet_reader_metadata() {
        let temp_file = create_test_parquet_file(100, 10000);

        let reader = ParquetBatchReader::open(temp_file.path(), 10).await.unwrap();

        assert_eq!(reader.total_rows(), 100);
        assert_eq!(reader.schema().fields().len(), 3);
        assert_eq!(reader.schema().field(0).name(), "id");
    }

    #[tokio::test]
    async fn test_batches_bounded_by_batch_size() {
        let temp_file = create_test_parquet_file(250, 10000);

        let mut reader = ParquetBatchReader::open(temp_file.path(), 100).await.unwrap();
        let sizes = collect_batch_sizes(&mut reader).await;

        assert_eq!(sizes, vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn test_batch_size_larger_than_file() {
        let temp_file = create_test_parquet_file(42, 10000);

        let mut reader = ParquetBatchReader::open(temp_file.path(), 1_000_000).await.unwrap();
        let sizes = collect_batch_sizes(&mut reader).await;

        assert_eq!(sizes, vec![42]);
    }

    #[tokio::test]
    async fn test_multiple_row_groups_preserve_row_count() {
        // ~10 row groups of 100 rows, batches of 64 never span them
        let temp_file = create_test_parquet_file(1000, 100);

        let mut reader = ParquetBatchReader::open(temp_file.path(), 64).await.unwrap();
        let sizes = collect_batch_sizes(&mut reader).await;

        assert!(sizes.iter().all(|&s| s <= 64));
        assert_eq!(sizes.iter().sum::<usize>(), 1000);
    }

    #[tokio::test]
    async fn test_open_missing_file_fails() {
        let result = ParquetBatchReader::open("/nonexistent/trips.parquet", 10).await;

        let err = result.err().unwrap();
        assert!(err.to_string().contains("/nonexistent/trips.parquet"));
    }
}
