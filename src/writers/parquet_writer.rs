use crate::error::{MapError, Result};
use crate::models::{MeanAttribute, StationRecord, Variable};
use crate::utils::constants::{
    DATE_COLUMN, DEFAULT_ROW_GROUP_SIZE, GEOMETRY_COLUMN, REGION_COLUMN,
};
use crate::utils::wkb::encode_point;
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Writes station records with the same layout the reader expects:
/// WKB geometry, region, date, the 21 day columns and the two means.
pub struct StationParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl StationParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(parquet::basic::ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(MapError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write records to a Parquet file. An empty slice still produces a
    /// valid file with the full schema.
    pub fn write_records(&self, records: &[StationRecord], path: &Path) -> Result<()> {
        let schema = self.create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        if !records.is_empty() {
            let batch = self.records_to_batch(records, schema)?;
            writer.write(&batch)?;
        }
        writer.close()?;

        tracing::debug!("Wrote {} station records to {}", records.len(), path.display());
        Ok(())
    }

    fn create_schema(&self) -> Arc<Schema> {
        let mut fields = vec![
            Field::new(GEOMETRY_COLUMN, DataType::Binary, false),
            Field::new(REGION_COLUMN, DataType::Utf8, false),
            Field::new(DATE_COLUMN, DataType::Date32, false),
        ];

        for variable in Variable::ALL {
            for name in variable.column_names() {
                fields.push(Field::new(name.as_str(), DataType::Float64, true));
            }
        }
        for attribute in MeanAttribute::ALL {
            fields.push(Field::new(attribute.column_name(), DataType::Float64, true));
        }

        Arc::new(Schema::new(fields))
    }

    fn records_to_batch(
        &self,
        records: &[StationRecord],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let geometries: Vec<Vec<u8>> = records
            .iter()
            .map(|r| encode_point(r.location()))
            .collect();
        let regions: Vec<&str> = records.iter().map(|r| r.region.as_str()).collect();
        let dates: Vec<i32> = records.iter().map(|r| days_since_epoch(r.date)).collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(BinaryArray::from_iter_values(geometries.iter())),
            Arc::new(StringArray::from(regions)),
            Arc::new(Date32Array::from(dates)),
        ];

        // NaN goes back out as null so other tools see a missing value.
        let nullable = |values: Vec<f64>| -> ArrayRef {
            Arc::new(Float64Array::from(
                values
                    .into_iter()
                    .map(|v| (!v.is_nan()).then_some(v))
                    .collect::<Vec<Option<f64>>>(),
            ))
        };

        for variable in Variable::ALL {
            for index in 0..7 {
                columns.push(nullable(
                    records.iter().map(|r| r.series(variable)[index]).collect(),
                ));
            }
        }
        for attribute in MeanAttribute::ALL {
            columns.push(nullable(
                records.iter().map(|r| r.mean_value(attribute)).collect(),
            ));
        }

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
        })
    }
}

impl Default for StationParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Date32 stores days since 1970-01-01, which is day 719163 of the common era.
fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - 719_163
}

#[derive(Debug, Clone)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.total_rows as f64 / self.row_groups.max(1) as f64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::StationReader;
    use crate::test_support::sample_record;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_empty_records() -> Result<()> {
        let writer = StationParquetWriter::new();
        let temp_file = NamedTempFile::new()?;

        writer.write_records(&[], temp_file.path())?;
        let dataset = StationReader::new().read(temp_file.path())?;
        assert!(dataset.is_empty());
        assert_eq!(dataset.date, None);
        Ok(())
    }

    #[test]
    fn test_nan_written_as_null() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let mut record = sample_record();
        record.humidity[6] = f64::NAN;

        StationParquetWriter::new().write_records(&[record], temp_file.path())?;

        let dataset = StationReader::new().read(temp_file.path())?;
        assert!(dataset.records[0].humidity[6].is_nan());
        assert_eq!(dataset.records[0].humidity[5], 25.0);
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = StationParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_records(&[sample_record()], temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(StationParquetWriter::new().with_compression("brotli9").is_err());
        Ok(())
    }

    #[test]
    fn test_file_info() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let records = vec![sample_record(), sample_record(), sample_record()];
        StationParquetWriter::new()
            .with_row_group_size(2)
            .write_records(&records, temp_file.path())?;

        let info = StationParquetWriter::new().get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 3);
        assert_eq!(info.row_groups, 2);
        assert!(info.summary().contains("Total rows: 3"));
        Ok(())
    }
}
