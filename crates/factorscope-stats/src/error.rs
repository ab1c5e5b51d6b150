//! Error types for statistics computations.

use thiserror::Error;

/// Result type for statistics operations.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Errors that can occur while building series or computing statistics.
///
/// Numerical singularities (zero variance, zero volatility, zero tracking
/// error) are not errors: they surface as `None` in the computed outputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// Rolling window too short to define a standard deviation
    #[error("Invalid window: {window} (must be at least 2)")]
    InvalidWindow {
        /// Requested window length
        window: usize,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Column length does not match the date column
    #[error("Length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch {
        /// Number of dates
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// Dates are not strictly increasing
    #[error("Dates must be unique and strictly increasing (violated at index {index})")]
    UnsortedDates {
        /// First offending position
        index: usize,
    },

    /// Return column appears twice in a table
    #[error("Duplicate return column: {0}")]
    DuplicateColumn(String),

    /// Requested return column does not exist
    #[error("Unknown return column: {0}")]
    UnknownColumn(String),

    /// A required comparison series is absent
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Two or more series share no dates
    #[error("Series have no dates in common")]
    EmptyIntersection,

    /// Operation needs at least one observation
    #[error("Series is empty")]
    EmptySeries,

    /// Invalid quantile count
    #[error("Invalid number of quantiles: {requested}")]
    InvalidQuantiles {
        /// Requested number of buckets
        requested: usize,
    },

    /// Quantile edges collapse onto each other
    #[error("Quantile bin edges are not unique")]
    DuplicateBinEdges,
}
