//! Rolling-window statistics.
//!
//! For a trailing window of `w` months, the value at index `i` uses
//! observations `i - w + 1 ..= i`. The first `w - 1` entries are `None`
//! because not enough history exists.

use crate::error::{Result, StatsError};
use crate::moments::{annualize_mean, annualize_volatility, mean, ratio, std_dev};
use crate::series::ReturnSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Configuration for rolling statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingConfig {
    /// Trailing window length in periods (default: 12 months)
    pub window: usize,
    /// Periods per year used for annualization (default: 12)
    pub periods_per_year: u32,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            window: 12,
            periods_per_year: 12,
        }
    }
}

impl RollingConfig {
    /// Config with the given window and monthly annualization.
    pub fn with_window(window: usize) -> Self {
        Self {
            window,
            ..Default::default()
        }
    }

    /// Check the window and annualization settings.
    ///
    /// # Errors
    /// Returns an error if the window is shorter than 2 or the period count
    /// is zero.
    pub fn validate(&self) -> Result<()> {
        validate_window(self.window)?;
        validate_periods(self.periods_per_year)
    }
}

pub(crate) const fn validate_window(window: usize) -> Result<()> {
    if window < 2 {
        return Err(StatsError::InvalidWindow { window });
    }
    Ok(())
}

pub(crate) fn validate_periods(periods_per_year: u32) -> Result<()> {
    if periods_per_year == 0 {
        return Err(StatsError::InvalidParameter(
            "periods_per_year must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Evaluate `f` over every complete trailing window of a sequence of
/// length `len`; incomplete windows yield `None`.
pub(crate) fn rolling_apply<F>(len: usize, window: usize, mut f: F) -> Vec<Option<f64>>
where
    F: FnMut(Range<usize>) -> Option<f64>,
{
    (0..len)
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                f(i + 1 - window..i + 1)
            }
        })
        .collect()
}

/// Rolling mean, volatility and Sharpe ratio aligned 1:1 with the source dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    /// Window length in periods.
    pub window: usize,
    /// Source dates.
    pub dates: Vec<NaiveDate>,
    /// Annualized rolling mean return.
    pub rolling_mean: Vec<Option<f64>>,
    /// Annualized rolling volatility.
    pub rolling_std: Vec<Option<f64>>,
    /// Rolling mean divided by rolling volatility.
    pub rolling_sharpe: Vec<Option<f64>>,
}

impl RollingStats {
    /// Number of rows.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether there are no rows.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Rolling statistics over a `window`-month trailing window with monthly
/// annualization.
///
/// # Errors
/// Returns [`StatsError::InvalidWindow`] if `window < 2`.
pub fn rolling_stats(series: &ReturnSeries, window: usize) -> Result<RollingStats> {
    rolling_stats_with(series, &RollingConfig::with_window(window))
}

/// Rolling statistics with explicit configuration.
///
/// # Errors
/// Returns an error if the configuration is invalid.
pub fn rolling_stats_with(series: &ReturnSeries, config: &RollingConfig) -> Result<RollingStats> {
    config.validate()?;
    let returns = series.returns();
    let periods = config.periods_per_year;

    tracing::debug!(
        series = series.name(),
        window = config.window,
        observations = returns.len(),
        "computing rolling statistics"
    );

    let rolling_mean = rolling_apply(returns.len(), config.window, |r| {
        mean(&returns[r]).map(|m| annualize_mean(m, periods))
    });
    let rolling_std = rolling_apply(returns.len(), config.window, |r| {
        std_dev(&returns[r]).map(|s| annualize_volatility(s, periods))
    });
    let rolling_sharpe = rolling_mean
        .iter()
        .zip(&rolling_std)
        .map(|(m, s)| ratio((*m)?, (*s)?))
        .collect();

    Ok(RollingStats {
        window: config.window,
        dates: series.dates().to_vec(),
        rolling_mean,
        rolling_std,
        rolling_sharpe,
    })
}
