#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod frame;
pub mod store;

pub use cache::{CacheStats, LoadCache};
pub use error::{DataError, Result};
pub use frame::{FactorFrame, MARKET_CAP_RANK};
pub use store::{FactorStore, LoadProgress, SeriesQuery, StoreConfig, factor_id};
