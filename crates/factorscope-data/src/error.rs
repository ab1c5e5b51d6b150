//! Error types for data operations.

use factorscope_stats::StatsError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or querying factor data.
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Required column is absent
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Data directory does not exist
    #[error("Data directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Group not found in the store
    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    /// Factor not found in a group
    #[error("Unknown factor {factor} in group {group}")]
    UnknownFactor {
        /// Group that was searched
        group: String,
        /// Requested factor id
        factor: String,
    },

    /// Filters leave more than one row for some month
    #[error("Selection for {0} has several rows per month; add rank filters")]
    AmbiguousSelection(String),

    /// Series construction error
    #[error("Series error: {0}")]
    Series(#[from] StatsError),
}
