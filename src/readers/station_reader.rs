use crate::error::{MapError, Result};
use crate::models::{Failure, MeanAttribute, Outcome, StationRecord, Variable};
use crate::utils::constants::{DATE_COLUMN, DEFAULT_BATCH_SIZE, GEOMETRY_COLUMN, REGION_COLUMN};
use crate::utils::wkb::decode_point;
use arrow::array::{Array, ArrayRef, BinaryArray, Date32Array, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;
use validator::Validate;

/// Station records of one dataset file plus the rows that could not be used.
#[derive(Debug)]
pub struct StationDataset {
    /// Observation date of the window's most recent day (J0).
    pub date: Option<NaiveDate>,
    pub records: Vec<StationRecord>,
    pub failures: Vec<Failure>,
}

impl StationDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub struct StationReader {
    batch_size: usize,
}

impl StationReader {
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Read every station row of a Parquet dataset.
    ///
    /// Rows with an undecodable geometry, a missing date or out-of-range
    /// coordinates are skipped and reported in `failures`.
    pub fn read(&self, path: &Path) -> Result<StationDataset> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(self.batch_size)
            .build()?;

        let mut outcome = Outcome::new();
        let mut next_id = 0usize;

        for batch_result in reader {
            let batch = batch_result?;
            let columns = BatchColumns::extract(&batch)?;

            for row in 0..batch.num_rows() {
                let id = next_id;
                next_id += 1;
                outcome.push(format!("row {}", id), columns.record(row, id));
            }
        }

        let date = dataset_date(&outcome.items);
        tracing::info!(
            "Read {} station records from {} ({} skipped)",
            outcome.items.len(),
            path.display(),
            outcome.failures.len()
        );

        Ok(StationDataset {
            date,
            records: outcome.items,
            failures: outcome.failures,
        })
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// The dataset describes one day; if rows disagree the earliest date wins.
fn dataset_date(records: &[StationRecord]) -> Option<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = records.iter().map(|r| r.date).collect();
    if dates.len() > 1 {
        tracing::warn!(
            "Dataset carries {} distinct dates; using the earliest",
            dates.len()
        );
    }
    dates.into_iter().next()
}

/// Owned, typed copies of the columns a station row needs.
struct BatchColumns {
    geometry: Vec<Option<Vec<u8>>>,
    region: Vec<Option<String>>,
    date: Vec<Option<NaiveDate>>,
    daily: Vec<[Vec<f64>; 7]>,
    mean_temperature: Vec<f64>,
    mean_humidity: Vec<f64>,
}

impl BatchColumns {
    fn extract(batch: &RecordBatch) -> Result<Self> {
        let mut daily = Vec::with_capacity(Variable::ALL.len());
        for variable in Variable::ALL {
            let names = variable.column_names();
            let series: Vec<Vec<f64>> = names
                .iter()
                .map(|name| float_column(batch, name))
                .collect::<Result<_>>()?;
            let series: [Vec<f64>; 7] = series.try_into().map_err(|_| {
                MapError::InvalidFormat(format!("Expected 7 day columns for {}", variable))
            })?;
            daily.push(series);
        }

        Ok(Self {
            geometry: binary_column(batch, GEOMETRY_COLUMN)?,
            region: string_column(batch, REGION_COLUMN)?,
            date: date_column(batch, DATE_COLUMN)?,
            daily,
            mean_temperature: float_column(batch, MeanAttribute::MeanTemperature.column_name())?,
            mean_humidity: float_column(batch, MeanAttribute::MeanHumidity.column_name())?,
        })
    }

    fn record(&self, row: usize, id: usize) -> Result<StationRecord> {
        let geometry = self.geometry[row]
            .as_deref()
            .ok_or_else(|| MapError::InvalidFormat("Missing geometry".to_string()))?;
        let point = decode_point(geometry)?;

        let date = self.date[row]
            .ok_or_else(|| MapError::InvalidFormat("Missing or unparseable DATE".to_string()))?;

        let week = |variable_index: usize| -> [f64; 7] {
            let mut values = [f64::NAN; 7];
            for (slot, column) in values.iter_mut().zip(self.daily[variable_index].iter()) {
                *slot = column[row];
            }
            values
        };

        let record = StationRecord {
            id,
            region: self.region[row].clone().unwrap_or_default(),
            date,
            latitude: point.latitude,
            longitude: point.longitude,
            precipitation: week(0),
            temperature: week(1),
            humidity: week(2),
            mean_temperature: self.mean_temperature[row],
            mean_humidity: self.mean_humidity[row],
        };

        record.validate()?;
        Ok(record)
    }
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| MapError::MissingColumn(name.to_string()))
}

fn type_error(name: &str, data_type: &DataType) -> MapError {
    MapError::InvalidFormat(format!("Column {} has unsupported type {}", name, data_type))
}

/// Any numeric column as f64, nulls as NaN.
fn float_column(batch: &RecordBatch, name: &str) -> Result<Vec<f64>> {
    let raw = column(batch, name)?;
    let casted = cast(raw, &DataType::Float64)?;
    let values = casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| type_error(name, raw.data_type()))?;

    Ok((0..values.len())
        .map(|i| {
            if values.is_null(i) {
                f64::NAN
            } else {
                values.value(i)
            }
        })
        .collect())
}

fn string_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<String>>> {
    let raw = column(batch, name)?;
    let casted = cast(raw, &DataType::Utf8)?;
    let values = casted
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| type_error(name, raw.data_type()))?;

    Ok((0..values.len())
        .map(|i| (!values.is_null(i)).then(|| values.value(i).to_string()))
        .collect())
}

fn binary_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<Vec<u8>>>> {
    let raw = column(batch, name)?;
    let casted = cast(raw, &DataType::Binary)?;
    let values = casted
        .as_any()
        .downcast_ref::<BinaryArray>()
        .ok_or_else(|| type_error(name, raw.data_type()))?;

    Ok((0..values.len())
        .map(|i| (!values.is_null(i)).then(|| values.value(i).to_vec()))
        .collect())
}

/// Date32/Date64 columns directly, string columns as `YYYY-MM-DD`
/// (a trailing time part is ignored).
fn date_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let raw = column(batch, name)?;
    match raw.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => Ok(string_column(batch, name)?
            .into_iter()
            .map(|text| {
                text.and_then(|t| {
                    let day = t.trim().get(..10).unwrap_or(t.trim()).to_string();
                    NaiveDate::parse_from_str(&day, "%Y-%m-%d").ok()
                })
            })
            .collect()),
        _ => {
            let casted = cast(raw, &DataType::Date32)?;
            let values = casted
                .as_any()
                .downcast_ref::<Date32Array>()
                .ok_or_else(|| type_error(name, raw.data_type()))?;

            Ok((0..values.len())
                .map(|i| {
                    if values.is_null(i) {
                        None
                    } else {
                        values.value_as_date(i)
                    }
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayOffset, GeoPoint};
    use crate::test_support::{sample_record, station};
    use crate::utils::wkb::encode_point;
    use crate::writers::StationParquetWriter;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_reads_written_dataset() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("stations.parquet");

        let records = vec![
            station(0, "Souss-Massa", 30.42, -9.6),
            station(1, "Oriental", 34.68, -1.9),
        ];
        StationParquetWriter::new().write_records(&records, &path)?;

        let dataset = StationReader::new().read(&path)?;
        assert_eq!(dataset.len(), 2);
        assert!(dataset.failures.is_empty());
        assert_eq!(dataset.date, Some(sample_record().date));

        let oriental = &dataset.records[1];
        assert_eq!(oriental.region, "Oriental");
        assert!((oriental.latitude - 34.68).abs() < 1e-12);
        assert_eq!(
            oriental.daily_value(Variable::Temperature, DayOffset::current()),
            16.0
        );
        assert_eq!(oriental.mean_humidity, 30.1);
        Ok(())
    }

    /// Hand-built file: string dates, integer day columns, nulls and a
    /// broken geometry.
    fn write_loose_dataset(path: &Path) -> Result<()> {
        let mut fields = vec![
            Field::new(GEOMETRY_COLUMN, DataType::Binary, true),
            Field::new(REGION_COLUMN, DataType::Utf8, true),
            Field::new(DATE_COLUMN, DataType::Utf8, true),
        ];
        let mut arrays: Vec<ArrayRef> = vec![
            Arc::new(BinaryArray::from(vec![
                Some(encode_point(GeoPoint::new(31.5, -8.0)).as_slice()),
                Some(&b"\x01\x01"[..]),
                Some(encode_point(GeoPoint::new(33.0, -7.5)).as_slice()),
            ])),
            Arc::new(StringArray::from(vec![
                Some("Marrakech-Safi"),
                Some("Marrakech-Safi"),
                Some("Casablanca-Settat"),
            ])),
            Arc::new(StringArray::from(vec![
                Some("2023-12-11"),
                Some("2023-12-11"),
                Some("2023-12-10T00:00:00"),
            ])),
        ];

        for variable in Variable::ALL {
            for name in variable.column_names() {
                fields.push(Field::new(name.as_str(), DataType::Int64, true));
                arrays.push(Arc::new(Int64Array::from(vec![Some(3), Some(4), None])));
            }
        }
        for attribute in MeanAttribute::ALL {
            fields.push(Field::new(attribute.column_name(), DataType::Float64, true));
            arrays.push(Arc::new(Float64Array::from(vec![Some(22.0), None, Some(18.0)])));
        }

        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays)?;
        let mut writer = ArrowWriter::try_new(File::create(path)?, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }

    #[test]
    fn test_loose_types_and_bad_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("loose.parquet");
        write_loose_dataset(&path)?;

        let dataset = StationReader::new().read(&path)?;
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.failures.len(), 1);
        assert_eq!(dataset.failures[0].subject, "row 1");

        let first = &dataset.records[0];
        assert_eq!(first.precipitation[0], 3.0);
        assert_eq!(first.latitude, 31.5);

        let second = &dataset.records[1];
        assert!(second.temperature.iter().all(|v| v.is_nan()));
        assert_eq!(second.id, 2);

        // Earliest of the two dates present.
        assert_eq!(dataset.date, NaiveDate::from_ymd_opt(2023, 12, 10));
        Ok(())
    }

    #[test]
    fn test_missing_column() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("bare.parquet");

        let schema = Arc::new(Schema::new(vec![Field::new(
            REGION_COLUMN,
            DataType::Utf8,
            false,
        )]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(StringArray::from(vec!["Oriental"])) as ArrayRef],
        )?;
        let mut writer = ArrowWriter::try_new(File::create(&path)?, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        let result = StationReader::new().read(&path);
        assert!(matches!(result, Err(MapError::MissingColumn(_))));
        Ok(())
    }
}
