//! Error types for the analysis pipeline.

use factorscope_data::DataError;
use factorscope_output::ExportError;
use factorscope_portfolio::PortfolioError;
use factorscope_stats::StatsError;
use thiserror::Error;

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that stop an analysis request.
///
/// Recoverable conditions such as a missing market portfolio are reported as
/// [`AnalysisWarning`](crate::AnalysisWarning)s instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The request names no factors
    #[error("No factors selected")]
    NoFactors,

    /// A factor selection could not be parsed or is repeated
    #[error("Invalid factor selection: {0}")]
    InvalidSelection(String),

    /// Every selected factor came back empty
    #[error("No data for the selected factors")]
    NoData,

    /// The focus series is not part of the report
    #[error("Unknown focus series: {0}")]
    UnknownFocus(String),

    /// Data store error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Statistics error
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// Portfolio construction error
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    /// Export error
    #[error(transparent)]
    Export(#[from] ExportError),
}
