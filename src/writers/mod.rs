pub mod csv_writer;
pub mod json_writer;
pub mod parquet_writer;

pub use csv_writer::CsvWriter;
pub use json_writer::{read_json, write_json};
pub use parquet_writer::{ParquetFileInfo, ParquetWriter, StationColumns};

use crate::error::ProcessingError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ProcessingError::Config(format!(
                "Unsupported output format: {}",
                s
            ))),
        }
    }
}
