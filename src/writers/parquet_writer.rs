use crate::error::{ProcessingError, Result};
use crate::models::{DailyRecord, Precipitation, StationMetadata, StationQuery};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Station columns repeated on every row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationColumns {
    pub station_name: String,
    pub prec_no: u32,
    pub block_no: u32,
}

impl From<&StationQuery> for StationColumns {
    fn from(query: &StationQuery) -> Self {
        Self {
            station_name: query.station_name.clone(),
            prec_no: query.station_precip_id,
            block_no: query.station_block_id,
        }
    }
}

impl From<&StationMetadata> for StationColumns {
    fn from(station: &StationMetadata) -> Self {
        Self {
            station_name: station.name.clone(),
            prec_no: station.prec_no,
            block_no: station.block_no,
        }
    }
}

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
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

    /// Write daily records to a Parquet file
    pub fn write_records(
        &self,
        station: &StationColumns,
        records: &[DailyRecord],
        path: &Path,
    ) -> Result<()> {
        self.write_records_batched(station, records, path, records.len().max(1))
    }

    /// Write records in batches for memory efficiency
    pub fn write_records_batched(
        &self,
        station: &StationColumns,
        records: &[DailyRecord],
        path: &Path,
        batch_size: usize,
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let schema = self.create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in records.chunks(batch_size.max(1)) {
            let batch = self.records_to_batch(station, chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(())
    }

    /// Create Arrow schema for daily records
    fn create_schema(&self) -> Arc<Schema> {
        let fields = vec![
            Field::new("station_name", DataType::Utf8, false),
            Field::new("prec_no", DataType::UInt32, false),
            Field::new("block_no", DataType::UInt32, false),
            Field::new("date", DataType::Date32, false),
            Field::new("max_temp", DataType::Float64, true),
            Field::new("min_temp", DataType::Float64, true),
            Field::new("precipitation", DataType::Utf8, true),
        ];

        Arc::new(Schema::new(fields))
    }

    /// Convert records to Arrow RecordBatch
    fn records_to_batch(
        &self,
        station: &StationColumns,
        records: &[DailyRecord],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let n = records.len();
        let station_names = vec![station.station_name.as_str(); n];
        let prec_nos = vec![station.prec_no; n];
        let block_nos = vec![station.block_no; n];
        let dates: Vec<i32> = records.iter().map(|r| days_since_epoch(r.date)).collect();
        let max_temps: Vec<Option<f64>> = records.iter().map(|r| r.max_temp).collect();
        let min_temps: Vec<Option<f64>> = records.iter().map(|r| r.min_temp).collect();
        let precipitation: Vec<Option<&str>> = records
            .iter()
            .map(|r| r.precipitation.map(|p| p.as_str()))
            .collect();

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(station_names)),
                Arc::new(UInt32Array::from(prec_nos)),
                Arc::new(UInt32Array::from(block_nos)),
                Arc::new(Date32Array::from(dates)),
                Arc::new(Float64Array::from(max_temps)),
                Arc::new(Float64Array::from(min_temps)),
                Arc::new(StringArray::from(precipitation)),
            ],
        )?;

        Ok(batch)
    }

    /// Read up to `limit` records back (0 = all)
    pub fn read_records(
        &self,
        path: &Path,
        limit: usize,
    ) -> Result<Vec<(StationColumns, DailyRecord)>> {
        let limit = if limit == 0 { usize::MAX } else { limit };

        let file = File::open(path)?;
        let parquet_reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(limit.min(8192))
            .build()?;

        let mut records = Vec::new();

        for batch_result in parquet_reader {
            let batch = batch_result?;

            let station_names = column::<StringArray>(&batch, 0, "station_name")?;
            let prec_nos = column::<UInt32Array>(&batch, 1, "prec_no")?;
            let block_nos = column::<UInt32Array>(&batch, 2, "block_no")?;
            let dates = column::<Date32Array>(&batch, 3, "date")?;
            let max_temps = column::<Float64Array>(&batch, 4, "max_temp")?;
            let min_temps = column::<Float64Array>(&batch, 5, "min_temp")?;
            let precipitation = column::<StringArray>(&batch, 6, "precipitation")?;

            for i in 0..batch.num_rows() {
                if records.len() >= limit {
                    return Ok(records);
                }

                let date = date_from_days(dates.value(i)).ok_or_else(|| {
                    ProcessingError::InvalidFormat("Invalid date in Parquet file".to_string())
                })?;
                let optional = |array: &Float64Array| (!array.is_null(i)).then(|| array.value(i));
                let precip = (!precipitation.is_null(i))
                    .then(|| Precipitation::parse(precipitation.value(i)))
                    .flatten();

                let station = StationColumns {
                    station_name: station_names.value(i).to_string(),
                    prec_no: prec_nos.value(i),
                    block_no: block_nos.value(i),
                };

                // rows without any temperature are never written
                if let Some(record) =
                    DailyRecord::new(date, optional(max_temps), optional(min_temps), precip)
                {
                    records.push((station, record));
                }
            }
        }

        Ok(records)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            metadata.row_group(0).column(0).compression()
        } else {
            self.compression
        };

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, index: usize, name: &str) -> Result<&'a T> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column type", name)))
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

fn date_from_days(days: i32) -> Option<NaiveDate> {
    unix_epoch().checked_add_signed(chrono::Duration::days(days as i64))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
            avg_rows
        )
    }
}
