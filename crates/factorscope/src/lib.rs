#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod catalog;
pub mod error;
pub mod export;
pub mod key;

// Re-export main types from sub-crates
pub use factorscope_data as data;
pub use factorscope_output as output;
pub use factorscope_portfolio as portfolio;
pub use factorscope_stats as stats;

pub use analysis::{
    AnalysisReport, AnalysisRequest, AnalysisWarning, DEFAULT_RETURN_COLUMN, FocusReport,
    MARKET_NAME, SeriesReport, analyze,
};
pub use catalog::display_name;
pub use error::{AnalysisError, Result};
pub use key::{FactorSelection, SeriesKey};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
