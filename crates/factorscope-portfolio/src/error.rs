//! Error types for portfolio blending.

use factorscope_stats::StatsError;
use thiserror::Error;

/// Result type for portfolio operations.
pub type Result<T> = std::result::Result<T, PortfolioError>;

/// Errors that can occur while weighting or blending series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortfolioError {
    /// Nothing to blend
    #[error("No series to blend")]
    NoSeries,

    /// Constituents share no dates
    #[error("No common dates across constituents")]
    NoCommonDates,

    /// Constituents share no return column
    #[error("No return column is shared by all constituents")]
    NoSharedColumns,

    /// Negative, non-finite or zero-sum weights
    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    /// A constituent has no weight
    #[error("Missing weight for series: {0}")]
    MissingWeight(String),

    /// A weight names a series that is not being blended
    #[error("Weight given for unknown series: {0}")]
    UnknownSeries(String),

    /// Series construction failed
    #[error("Series error: {0}")]
    Series(#[from] StatsError),
}
