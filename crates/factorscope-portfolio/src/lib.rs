#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod blend;
pub mod error;
pub mod weights;

pub use blend::{BlendedSeries, MULTIFACTOR_NAME, blend, blend_series};
pub use error::{PortfolioError, Result};
pub use weights::PortfolioWeights;

/// Column name used when blending single-column series.
pub const BLENDED_COLUMN: &str = "ret";
