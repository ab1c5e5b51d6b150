//! Weighted blending of factor return tables.
//!
//! The blend is restricted to dates present in every constituent. For each
//! retained date and each return column shared by all constituents, the
//! blended value is `sum(weight[k] * table[k][date][column])`.

use crate::error::{PortfolioError, Result};
use crate::weights::PortfolioWeights;
use chrono::NaiveDate;
use factorscope_stats::performance::cumulative_returns;
use factorscope_stats::{ReturnColumn, ReturnSeries, ReturnTable, common_dates};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default display name of the blended portfolio.
pub const MULTIFACTOR_NAME: &str = "Multifactor Portfolio";

/// Output of [`blend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendedSeries {
    /// Blended return columns on the common dates.
    pub table: ReturnTable,
    /// Cumulative value of the first blended return column.
    pub cumulative_return: Vec<f64>,
    /// Normalized weights that produced the blend.
    pub weights: PortfolioWeights,
}

impl BlendedSeries {
    /// Common dates of the blend.
    pub fn dates(&self) -> &[NaiveDate] {
        self.table.dates()
    }

    /// Name of the canonical return column.
    pub fn primary_column(&self) -> Option<&str> {
        self.table.column_names().next()
    }

    /// Project one blended column into a named series.
    ///
    /// # Errors
    /// Returns an error if the column was not blended.
    pub fn series(&self, name: impl Into<String>, column: &str) -> Result<ReturnSeries> {
        Ok(self.table.series(name, column)?)
    }
}

/// Columns present in every table, in the order of the first table.
fn shared_columns(tables: &BTreeMap<String, ReturnTable>) -> Vec<String> {
    let mut iter = tables.values();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let rest: Vec<&ReturnTable> = iter.collect();
    first
        .column_names()
        .filter(|name| rest.iter().all(|t| t.column(name).is_some()))
        .map(str::to_string)
        .collect()
}

/// Check that weights and tables cover the same identifiers.
fn check_coverage(tables: &BTreeMap<String, ReturnTable>, weights: &PortfolioWeights) -> Result<()> {
    if let Some(id) = tables.keys().find(|id| weights.get(id).is_none()) {
        return Err(PortfolioError::MissingWeight(id.clone()));
    }
    if let Some(id) = weights.ids().find(|id| !tables.contains_key(*id)) {
        return Err(PortfolioError::UnknownSeries(id.to_string()));
    }
    Ok(())
}

/// Blend return tables into one weighted portfolio.
///
/// Without weights every constituent gets `1 / N`.
///
/// # Errors
/// Returns [`PortfolioError::NoSeries`] for an empty map,
/// [`PortfolioError::NoCommonDates`] when the constituents share no dates,
/// [`PortfolioError::NoSharedColumns`] when no return column is common to all
/// of them, and a weight error if the weights do not match the constituents.
pub fn blend(
    tables: &BTreeMap<String, ReturnTable>,
    weights: Option<&PortfolioWeights>,
) -> Result<BlendedSeries> {
    if tables.is_empty() {
        return Err(PortfolioError::NoSeries);
    }

    let weights = match weights {
        Some(w) => w.clone(),
        None => PortfolioWeights::equal(tables.keys().cloned())?,
    };
    check_coverage(tables, &weights)?;

    let dates = common_dates(tables.values().map(ReturnTable::dates));
    if dates.is_empty() {
        tracing::warn!(constituents = tables.len(), "no common dates across constituents");
        return Err(PortfolioError::NoCommonDates);
    }

    let columns = shared_columns(tables);
    if columns.is_empty() {
        return Err(PortfolioError::NoSharedColumns);
    }

    tracing::debug!(
        constituents = tables.len(),
        dates = dates.len(),
        columns = columns.len(),
        "blending portfolio"
    );

    let mut blended: Vec<ReturnColumn> = columns
        .iter()
        .map(|name| ReturnColumn::new(name.clone(), vec![0.0; dates.len()]))
        .collect();

    for (id, table) in tables {
        let weight = weights.get(id).unwrap_or_default();
        let positions: Vec<usize> = dates
            .iter()
            .filter_map(|d| table.dates().binary_search(d).ok())
            .collect();

        for column in &mut blended {
            let Some(values) = table.column(&column.name) else {
                continue;
            };
            for (out, &pos) in column.values.iter_mut().zip(&positions) {
                *out += weight * values[pos];
            }
        }
    }

    let cumulative_return = cumulative_returns(&blended[0].values);
    let table = ReturnTable::new(dates, blended)?;

    Ok(BlendedSeries {
        table,
        cumulative_return,
        weights,
    })
}

/// Blend single-column series; each series becomes a one-column table
/// keyed by its name.
///
/// # Errors
/// See [`blend`].
pub fn blend_series(
    series: &BTreeMap<String, ReturnSeries>,
    weights: Option<&PortfolioWeights>,
) -> Result<BlendedSeries> {
    let tables = series
        .iter()
        .map(|(id, s)| {
            let table = ReturnTable::from(s.clone().with_name(crate::BLENDED_COLUMN));
            (id.clone(), table)
        })
        .collect();
    blend(&tables, weights)
}
