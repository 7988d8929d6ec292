use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Daily data table not found in document")]
    TableNotFound,

    #[error("No daily data extracted for {year}-{month:02}")]
    NoDataExtracted { year: i32, month: u32 },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Station '{0}' not found")]
    StationNotFound(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl ProcessingError {
    /// Whether the failure belongs to a single month and a range run may carry on
    pub fn is_month_scoped(&self) -> bool {
        matches!(
            self,
            ProcessingError::FetchFailed { .. }
                | ProcessingError::TableNotFound
                | ProcessingError::NoDataExtracted { .. }
        )
    }
}
