//! Series identifiers and factor selections.

use crate::catalog;
use crate::error::AnalysisError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// `group/factor` identifier of a factor portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[display("{group}/{factor}")]
pub struct SeriesKey {
    /// Group directory name.
    pub group: String,
    /// Factor id within the group.
    pub factor: String,
}

impl SeriesKey {
    /// Create a key.
    pub fn new(group: impl Into<String>, factor: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            factor: factor.into(),
        }
    }

    /// Human-readable name from the catalog.
    pub fn display_name(&self) -> String {
        catalog::display_name(&self.to_string())
    }
}

impl FromStr for SeriesKey {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((group, factor))
                if !group.is_empty() && !factor.is_empty() && !factor.contains('/') =>
            {
                Ok(Self::new(group, factor))
            }
            _ => Err(AnalysisError::InvalidSelection(format!(
                "expected group/factor, got `{s}`"
            ))),
        }
    }
}

/// A factor together with the factor-rank filters applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorSelection {
    /// Factor portfolio.
    pub key: SeriesKey,
    /// `rank_*` column to required value.
    pub rank_filters: BTreeMap<String, i64>,
}

impl FactorSelection {
    /// Selection without rank filters.
    pub const fn new(key: SeriesKey) -> Self {
        Self {
            key,
            rank_filters: BTreeMap::new(),
        }
    }

    /// Add a rank filter.
    pub fn with_rank(mut self, column: impl Into<String>, value: i64) -> Self {
        self.rank_filters.insert(column.into(), value);
        self
    }
}

impl From<SeriesKey> for FactorSelection {
    fn from(key: SeriesKey) -> Self {
        Self::new(key)
    }
}

/// Parses `group/factor[:rank_col=value,...]`.
impl FromStr for FactorSelection {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, filters) = match s.split_once(':') {
            Some((key, filters)) => (key, Some(filters)),
            None => (s, None),
        };
        let mut selection = Self::new(key.trim().parse()?);

        for filter in filters.into_iter().flat_map(|f| f.split(',')) {
            let filter = filter.trim();
            if filter.is_empty() {
                continue;
            }
            let (column, value) = filter.split_once('=').ok_or_else(|| {
                AnalysisError::InvalidSelection(format!("expected rank_col=value, got `{filter}`"))
            })?;
            let value = value.trim().parse::<i64>().map_err(|e| {
                AnalysisError::InvalidSelection(format!("rank value `{value}`: {e}"))
            })?;
            selection = selection.with_rank(column.trim(), value);
        }
        Ok(selection)
    }
}
