#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod align;
pub mod correlation;
pub mod drawdown;
pub mod error;
pub mod moments;
pub mod performance;
pub mod quantile;
pub mod relative;
pub mod rolling;
pub mod series;
pub mod summary;

// Re-export main types
pub use align::{AlignedPair, AlignmentPolicy, UnionAligned, common_dates};
pub use correlation::{CorrelationMatrix, correlation_matrix, excess_return_correlation};
pub use drawdown::{DrawdownSeries, drawdown};
pub use error::{Result, StatsError};
pub use performance::{
    CumulativeSeries, cumulative_returns, cumulative_value, excess_cumulative_returns,
};
pub use quantile::{QuantileBucket, quantile_analysis};
pub use relative::{RelativeConfig, RelativeStats, relative_performance, relative_performance_with};
pub use rolling::{RollingConfig, RollingStats, rolling_stats, rolling_stats_with};
pub use series::{ReturnColumn, ReturnSeries, ReturnTable};
pub use summary::{
    Metric, MetricKind, SummaryConfig, SummaryStatistics, market_relative_statistics,
    market_relative_statistics_with, summary_statistics, summary_statistics_with,
};
