#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod export;
pub mod format;
pub mod frame;
pub mod table;

pub use columns::{Columnar, DatedColumns};
pub use export::{ExportError, ExportFormat, Exporter};
pub use format::{
    NOT_AVAILABLE, format_count, format_metric, format_number, format_percent, format_value,
};
pub use frame::ToFrame;
pub use table::{StatisticsTable, weights_table};
