//! Error types for forecast output serialization.

use thiserror::Error;

/// Result type alias using OutputError.
pub type Result<T> = std::result::Result<T, OutputError>;

/// Errors that can occur while serializing forecast output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Construction-time defect in the core data model.
    #[error(transparent)]
    Core(#[from] forecast_core::CoreError),

    /// A tensor time value has no corresponding flag entry; the flag join
    /// would leave null flags on rows at this date.
    #[error("no forecast/data_assimilation flags for time {0}")]
    UnmatchedTime(chrono::NaiveDate),

    /// Zarr format error.
    #[error("Zarr format error: {0}")]
    Zarr(String),

    /// Storage/IO error from the array store.
    #[error("storage error: {0}")]
    Storage(String),

    /// Missing variable or attribute when reading a container back.
    #[error("missing required data: {0}")]
    MissingData(String),

    /// Malformed container contents on read-back.
    #[error("invalid container data: {0}")]
    InvalidFormat(String),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
