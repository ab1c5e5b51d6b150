//! Rolling performance relative to a market series.
//!
//! Rolling alpha is the annualized difference of window means, rolling beta
//! is `cov(p, m) / var(m)`, tracking error is the annualized standard
//! deviation of `p - m` and the information ratio is alpha over tracking
//! error. A window containing an undefined observation is undefined.

use crate::align::{AlignmentPolicy, UnionAligned};
use crate::error::{Result, StatsError};
use crate::moments::{annualize_mean, annualize_volatility, covariance, mean, ratio, std_dev, variance};
use crate::performance::{cumulative_returns, cumulative_returns_with_gaps};
use crate::rolling::{rolling_apply, validate_periods, validate_window};
use crate::series::ReturnSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Configuration for relative performance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativeConfig {
    /// Trailing window length in periods (default: 12 months)
    pub window: usize,
    /// Periods per year used for annualization (default: 12)
    pub periods_per_year: u32,
    /// How the portfolio and market dates are matched (default: intersection)
    pub alignment: AlignmentPolicy,
}

impl Default for RelativeConfig {
    fn default() -> Self {
        Self {
            window: 12,
            periods_per_year: 12,
            alignment: AlignmentPolicy::Intersection,
        }
    }
}

impl RelativeConfig {
    /// Config with the given window and default alignment.
    pub fn with_window(window: usize) -> Self {
        Self {
            window,
            ..Default::default()
        }
    }
}

/// Per-date cumulative values and rolling market-relative statistics.
///
/// Without a market series every market-derived column is present but
/// entirely `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeStats {
    /// Window length in periods.
    pub window: usize,
    /// Aligned dates.
    pub dates: Vec<NaiveDate>,
    /// Cumulative portfolio value.
    pub portfolio_value: Vec<Option<f64>>,
    /// Cumulative market value.
    pub market_value: Vec<Option<f64>>,
    /// Annualized rolling excess mean return.
    pub rolling_alpha: Vec<Option<f64>>,
    /// Rolling beta against the market.
    pub rolling_beta: Vec<Option<f64>>,
    /// Annualized rolling tracking error.
    pub tracking_error: Vec<Option<f64>>,
    /// Rolling alpha over rolling tracking error.
    pub information_ratio: Vec<Option<f64>>,
}

impl RelativeStats {
    /// Number of rows.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether there are no rows.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Whether any market-derived value is defined.
    pub fn has_market(&self) -> bool {
        self.market_value.iter().any(Option::is_some)
    }
}

/// Relative performance with monthly annualization and intersection alignment.
///
/// # Errors
/// Returns [`StatsError::InvalidWindow`] for `window < 2` and
/// [`StatsError::EmptyIntersection`] when a market series shares no dates
/// with `series`.
pub fn relative_performance(
    series: &ReturnSeries,
    market: Option<&ReturnSeries>,
    window: usize,
) -> Result<RelativeStats> {
    relative_performance_with(series, market, &RelativeConfig::with_window(window))
}

/// Relative performance with explicit configuration.
///
/// # Errors
/// See [`relative_performance`].
pub fn relative_performance_with(
    series: &ReturnSeries,
    market: Option<&ReturnSeries>,
    config: &RelativeConfig,
) -> Result<RelativeStats> {
    validate_window(config.window)?;
    validate_periods(config.periods_per_year)?;

    let Some(market) = market else {
        tracing::debug!(series = series.name(), "no market series, relative columns undefined");
        let n = series.len();
        return Ok(RelativeStats {
            window: config.window,
            dates: series.dates().to_vec(),
            portfolio_value: cumulative_returns(series.returns())
                .into_iter()
                .map(Some)
                .collect(),
            market_value: vec![None; n],
            rolling_alpha: vec![None; n],
            rolling_beta: vec![None; n],
            tracking_error: vec![None; n],
            information_ratio: vec![None; n],
        });
    };

    let aligned = match config.alignment {
        AlignmentPolicy::Intersection => UnionAligned::inner(series, market),
        AlignmentPolicy::Union => UnionAligned::outer(series, market),
    };
    if aligned.dates.is_empty() && !(series.is_empty() && market.is_empty()) {
        tracing::warn!(
            series = series.name(),
            market = market.name(),
            "series and market share no dates"
        );
        return Err(StatsError::EmptyIntersection);
    }

    tracing::debug!(
        series = series.name(),
        market = market.name(),
        window = config.window,
        aligned = aligned.dates.len(),
        policy = ?config.alignment,
        "computing relative performance"
    );

    Ok(compute(aligned, config))
}

/// Both sides of a window, or `None` if any observation is missing.
fn window_values(left: &[Option<f64>], right: &[Option<f64>]) -> Option<(Vec<f64>, Vec<f64>)> {
    let p = left.iter().copied().collect::<Option<Vec<f64>>>()?;
    let m = right.iter().copied().collect::<Option<Vec<f64>>>()?;
    Some((p, m))
}

fn compute(aligned: UnionAligned, config: &RelativeConfig) -> RelativeStats {
    let UnionAligned { dates, left, right } = aligned;
    let (window, periods) = (config.window, config.periods_per_year);
    let n = dates.len();

    let rolling_alpha = rolling_apply(n, window, |r| {
        let (p, m) = window_values(&left[r.clone()], &right[r])?;
        Some(annualize_mean(mean(&p)? - mean(&m)?, periods))
    });

    let rolling_beta = rolling_apply(n, window, |r| {
        let (p, m) = window_values(&left[r.clone()], &right[r])?;
        ratio(covariance(&p, &m)?, variance(&m)?)
    });

    let tracking_error = rolling_apply(n, window, |r| {
        let (p, m) = window_values(&left[r.clone()], &right[r])?;
        let diff: Vec<f64> = p.iter().zip(&m).map(|(a, b)| a - b).collect();
        std_dev(&diff).map(|s| annualize_volatility(s, periods))
    });

    let information_ratio = rolling_alpha
        .iter()
        .zip(&tracking_error)
        .map(|(a, te)| ratio((*a)?, (*te)?))
        .collect();

    RelativeStats {
        window,
        portfolio_value: cumulative_returns_with_gaps(&left),
        market_value: cumulative_returns_with_gaps(&right),
        dates,
        rolling_alpha,
        rolling_beta,
        tracking_error,
        information_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, m, 1).unwrap()
    }

    fn series(name: &str, months: &[u32], values: &[f64]) -> ReturnSeries {
        ReturnSeries::new(name, months.iter().map(|&m| month(m)).collect(), values.to_vec())
            .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = RelativeConfig::default();
        assert_eq!(config.window, 12);
        assert_eq!(config.periods_per_year, 12);
        assert_eq!(config.alignment, AlignmentPolicy::Intersection);
    }

    #[test]
    fn test_without_market_all_relative_columns_undefined() {
        let a = series("a", &[1, 2, 3, 4], &[0.01, 0.02, -0.01, 0.03]);
        let stats = relative_performance(&a, None, 2).unwrap();

        assert_eq!(stats.len(), 4);
        assert!(stats.portfolio_value.iter().all(Option::is_some));
        assert!(!stats.has_market());
        for column in [
            &stats.market_value,
            &stats.rolling_alpha,
            &stats.rolling_beta,
            &stats.tracking_error,
            &stats.information_ratio,
        ] {
            assert_eq!(column.len(), 4);
            assert!(column.iter().all(Option::is_none));
        }
    }

    #[test]
    fn test_rolling_relative_values() {
        let a = series("a", &[1, 2, 3, 4], &[0.01, 0.02, -0.01, 0.03]);
        let m = series("m", &[1, 2, 3, 4], &[0.005, 0.01, 0.0, 0.02]);
        let stats = relative_performance(&a, Some(&m), 4).unwrap();

        assert!(stats.rolling_alpha[..3].iter().all(Option::is_none));
        assert_relative_eq!(stats.rolling_alpha[3].unwrap(), 0.045, epsilon = 1e-12);
        assert_relative_eq!(
            stats.rolling_beta[3].unwrap(),
            1.885_714_285_714_285_7,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            stats.tracking_error[3].unwrap(),
            0.032_787_192_621_51,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            stats.information_ratio[3].unwrap(),
            0.045 / 0.032_787_192_621_51,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_identical_series_has_undefined_information_ratio() {
        let m = series("m", &[1, 2, 3], &[0.01, -0.02, 0.03]);
        let stats = relative_performance(&m, Some(&m), 3).unwrap();
        assert_relative_eq!(stats.rolling_beta[2].unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(stats.rolling_alpha[2].unwrap(), 0.0);
        assert!(stats.information_ratio[2].is_none());
    }

    #[test]
    fn test_intersection_alignment() {
        let a = series("a", &[1, 2, 3, 4, 5], &[0.01, 0.02, 0.03, 0.04, 0.05]);
        let m = series("m", &[2, 3, 4, 5, 6], &[0.01, 0.01, 0.02, 0.02, 0.03]);
        let stats = relative_performance(&a, Some(&m), 2).unwrap();
        assert_eq!(stats.dates, vec![month(2), month(3), month(4), month(5)]);
        assert!(stats.rolling_alpha[0].is_none());
        assert!(stats.rolling_alpha[1..].iter().all(Option::is_some));
    }

    #[test]
    fn test_union_alignment_propagates_holes() {
        let a = series("a", &[1, 2, 3, 4, 5], &[0.01, 0.02, 0.03, 0.04, 0.05]);
        let m = series("m", &[1, 2, 4, 5], &[0.01, 0.01, 0.02, 0.02]);
        let config = RelativeConfig {
            window: 2,
            alignment: AlignmentPolicy::Union,
            ..Default::default()
        };
        let stats = relative_performance_with(&a, Some(&m), &config).unwrap();

        assert_eq!(stats.len(), 5);
        assert!(stats.market_value[2].is_none());
        assert!(stats.rolling_alpha[1].is_some());
        // Windows touching month 3 have no market value
        assert!(stats.rolling_alpha[2].is_none());
        assert!(stats.rolling_alpha[3].is_none());
        assert!(stats.rolling_alpha[4].is_some());
    }

    #[test]
    fn test_disjoint_market_is_empty_intersection() {
        let a = series("a", &[1, 2], &[0.01, 0.02]);
        let m = series("m", &[3, 4], &[0.01, 0.02]);
        assert_eq!(
            relative_performance(&a, Some(&m), 2).unwrap_err(),
            StatsError::EmptyIntersection
        );
    }
}
