//! Error types for the signal evaluation pipeline.

use thiserror::Error;

/// Main error type for signal evaluation.
#[derive(Error, Debug)]
pub enum SigevalError {
    /// External market-data source failed or returned an unusable payload.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No data loaded")]
    NoData,
}

/// Result type alias for signal evaluation operations.
pub type Result<T> = std::result::Result<T, SigevalError>;
