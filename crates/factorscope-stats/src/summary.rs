//! Whole-period summary statistics.
//!
//! [`summary_statistics`] describes a series on its own; the
//! [`market_relative_statistics`] variant first inner-joins the series with
//! a market series and adds the CAPM-style comparison metrics. All metrics
//! are raw fractions or ratios; formatting is left to the presentation layer.

use crate::align::AlignedPair;
use crate::moments::{
    annualize_mean, annualize_volatility, correlation, covariance, excess_kurtosis, mean, ratio,
    skewness, std_dev, variance,
};
use crate::series::ReturnSeries;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Periods per year used for annualization (default: 12)
    pub periods_per_year: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            periods_per_year: 12,
        }
    }
}

/// How a metric should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    /// Annualized return or risk, shown as a percentage
    Percentage,
    /// Dimensionless ratio such as beta or Sharpe
    Ratio,
    /// Correlation or R-squared
    Correlation,
    /// Higher moment of the return distribution
    Distribution,
    /// Constituent count
    Count,
}

/// Summary metric keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Annualized mean return
    MeanReturn,
    /// Annualized volatility
    Volatility,
    /// Mean return over volatility (zero risk-free rate)
    SharpeRatio,
    /// Sample skewness
    Skewness,
    /// Sample excess kurtosis
    Kurtosis,
    /// Annualized return in excess of the market
    ExcessReturn,
    /// Annualized standard deviation of excess returns
    TrackingError,
    /// Excess return over tracking error
    InformationRatio,
    /// Annualized CAPM alpha
    Alpha,
    /// Market beta
    Beta,
    /// Correlation with the market
    Correlation,
    /// Squared correlation
    RSquared,
    /// Mean constituent count
    AverageStocks,
}

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Self; 13] = [
        Self::Beta,
        Self::Correlation,
        Self::AverageStocks,
        Self::Alpha,
        Self::ExcessReturn,
        Self::TrackingError,
        Self::InformationRatio,
        Self::RSquared,
        Self::SharpeRatio,
        Self::Skewness,
        Self::Kurtosis,
        Self::MeanReturn,
        Self::Volatility,
    ];

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::MeanReturn => "Mean Return (% p.a.)",
            Self::Volatility => "Volatility (% p.a.)",
            Self::SharpeRatio => "Sharpe Ratio",
            Self::Skewness => "Skewness",
            Self::Kurtosis => "Kurtosis",
            Self::ExcessReturn => "Excess Return (% p.a.)",
            Self::TrackingError => "Tracking Error (% p.a.)",
            Self::InformationRatio => "Information Ratio",
            Self::Alpha => "Annual Alpha (%)",
            Self::Beta => "Beta",
            Self::Correlation => "Correlation",
            Self::RSquared => "R-Squared",
            Self::AverageStocks => "Average N Stocks",
        }
    }

    /// Display category.
    pub const fn kind(self) -> MetricKind {
        match self {
            Self::MeanReturn
            | Self::Volatility
            | Self::ExcessReturn
            | Self::TrackingError
            | Self::Alpha => MetricKind::Percentage,
            Self::SharpeRatio | Self::InformationRatio | Self::Beta => MetricKind::Ratio,
            Self::Correlation | Self::RSquared => MetricKind::Correlation,
            Self::Skewness | Self::Kurtosis => MetricKind::Distribution,
            Self::AverageStocks => MetricKind::Count,
        }
    }

    /// Whether the metric needs a market series.
    pub const fn is_market_relative(self) -> bool {
        matches!(
            self,
            Self::ExcessReturn
                | Self::TrackingError
                | Self::InformationRatio
                | Self::Alpha
                | Self::Beta
                | Self::Correlation
                | Self::RSquared
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed-key summary of one series, optionally relative to a market.
///
/// Undefined metrics (missing market, too few observations, zero
/// denominators) are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Observations the statistics were computed on.
    pub observations: usize,
    /// Annualized mean return.
    pub mean_return: Option<f64>,
    /// Annualized volatility.
    pub volatility: Option<f64>,
    /// Sharpe ratio.
    pub sharpe_ratio: Option<f64>,
    /// Sample skewness.
    pub skewness: Option<f64>,
    /// Sample excess kurtosis.
    pub kurtosis: Option<f64>,
    /// Annualized excess return over the market.
    pub excess_return: Option<f64>,
    /// Annualized tracking error.
    pub tracking_error: Option<f64>,
    /// Information ratio.
    pub information_ratio: Option<f64>,
    /// Annualized CAPM alpha.
    pub alpha: Option<f64>,
    /// Market beta.
    pub beta: Option<f64>,
    /// Correlation with the market.
    pub correlation: Option<f64>,
    /// Squared correlation.
    pub r_squared: Option<f64>,
    /// Mean constituent count.
    pub average_n_stocks: Option<f64>,
}

impl SummaryStatistics {
    /// Value of a single metric.
    pub const fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::MeanReturn => self.mean_return,
            Metric::Volatility => self.volatility,
            Metric::SharpeRatio => self.sharpe_ratio,
            Metric::Skewness => self.skewness,
            Metric::Kurtosis => self.kurtosis,
            Metric::ExcessReturn => self.excess_return,
            Metric::TrackingError => self.tracking_error,
            Metric::InformationRatio => self.information_ratio,
            Metric::Alpha => self.alpha,
            Metric::Beta => self.beta,
            Metric::Correlation => self.correlation,
            Metric::RSquared => self.r_squared,
            Metric::AverageStocks => self.average_n_stocks,
        }
    }

    /// All metrics in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        Metric::ALL.into_iter().map(|m| (m, self.get(m)))
    }
}

/// Standalone statistics of one return series with monthly annualization.
pub fn summary_statistics(series: &ReturnSeries) -> SummaryStatistics {
    summary_statistics_with(series, &SummaryConfig::default())
}

/// Standalone statistics with explicit configuration.
pub fn summary_statistics_with(series: &ReturnSeries, config: &SummaryConfig) -> SummaryStatistics {
    standalone(series.returns(), series.n_stocks(), config.periods_per_year)
}

fn standalone(returns: &[f64], n_stocks: Option<&[f64]>, periods: u32) -> SummaryStatistics {
    let mean_return = mean(returns).map(|m| annualize_mean(m, periods));
    let volatility = std_dev(returns).map(|s| annualize_volatility(s, periods));
    let sharpe_ratio = match (mean_return, volatility) {
        (Some(m), Some(v)) if v > 0.0 => ratio(m, v),
        _ => None,
    };

    SummaryStatistics {
        observations: returns.len(),
        mean_return,
        volatility,
        sharpe_ratio,
        skewness: skewness(returns),
        kurtosis: excess_kurtosis(returns),
        average_n_stocks: n_stocks.and_then(mean),
        ..Default::default()
    }
}

/// Market-relative statistics with monthly annualization.
///
/// Both series are first restricted to their common dates; an empty
/// intersection leaves every metric undefined.
pub fn market_relative_statistics(series: &ReturnSeries, market: &ReturnSeries) -> SummaryStatistics {
    market_relative_statistics_with(series, market, &SummaryConfig::default())
}

/// Market-relative statistics with explicit configuration.
pub fn market_relative_statistics_with(
    series: &ReturnSeries,
    market: &ReturnSeries,
    config: &SummaryConfig,
) -> SummaryStatistics {
    let periods = config.periods_per_year;
    let pair = AlignedPair::intersect(series, market);

    if pair.is_empty() {
        tracing::warn!(
            series = series.name(),
            market = market.name(),
            "no common dates with market, relative statistics undefined"
        );
        return SummaryStatistics::default();
    }

    tracing::debug!(
        series = series.name(),
        market = market.name(),
        aligned = pair.len(),
        "computing market-relative statistics"
    );

    let (p, m) = (pair.left(), pair.right());
    let mut stats = standalone(p, pair.left_n_stocks(), periods);

    let beta = covariance(p, m).zip(variance(m)).and_then(|(c, v)| ratio(c, v));
    let market_mean = mean(m).map(|mm| annualize_mean(mm, periods));
    let correlation = correlation(p, m);
    let tracking_error =
        std_dev(&pair.differences()).map(|s| annualize_volatility(s, periods));
    let excess_return = stats.mean_return.zip(market_mean).map(|(pm, mm)| pm - mm);

    stats.beta = beta;
    stats.alpha = stats
        .mean_return
        .zip(market_mean)
        .zip(beta)
        .map(|((pm, mm), b)| pm - b * mm);
    stats.excess_return = excess_return;
    stats.tracking_error = tracking_error;
    stats.information_ratio = match (excess_return, tracking_error) {
        (Some(x), Some(te)) if te > 0.0 => ratio(x, te),
        _ => None,
    };
    stats.correlation = correlation;
    stats.r_squared = correlation.map(|c| c * c);

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, 1).unwrap()
    }

    fn series(name: &str, values: &[f64]) -> ReturnSeries {
        let dates = (1..=values.len() as u32).map(month).collect();
        ReturnSeries::new(name, dates, values.to_vec()).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let a = series("A", &[0.01, 0.02, -0.01, 0.03]);
        let m = series("M", &[0.005, 0.01, 0.0, 0.02]);
        let stats = market_relative_statistics(&a, &m);

        assert_eq!(stats.observations, 4);
        assert_relative_eq!(stats.mean_return.unwrap(), 0.0125 * 12.0, epsilon = 1e-12);
        assert_relative_eq!(stats.volatility.unwrap(), 0.059_160_797_830_996_155, epsilon = 1e-12);
        assert_relative_eq!(stats.sharpe_ratio.unwrap(), 2.535_462_764_185_550_3, epsilon = 1e-9);
        assert_relative_eq!(stats.beta.unwrap(), 1.885_714_285_714_285_7, epsilon = 1e-9);
        assert_relative_eq!(stats.correlation.unwrap(), 0.942_857_142_857_143_1, epsilon = 1e-9);
        assert_relative_eq!(
            stats.r_squared.unwrap(),
            0.942_857_142_857_143_1_f64.powi(2),
            epsilon = 1e-9
        );
        assert_relative_eq!(stats.alpha.unwrap(), -0.048, epsilon = 1e-9);
        assert_relative_eq!(stats.excess_return.unwrap(), 0.045, epsilon = 1e-12);
        assert_relative_eq!(stats.tracking_error.unwrap(), 0.032_787_192_621_51, epsilon = 1e-9);
        assert_relative_eq!(
            stats.information_ratio.unwrap(),
            0.045 / 0.032_787_192_621_51,
            epsilon = 1e-6
        );
        assert_relative_eq!(stats.skewness.unwrap(), -0.752_837_199_131_725_1, epsilon = 1e-9);
        assert_relative_eq!(stats.kurtosis.unwrap(), 0.342_857_142_857_139, epsilon = 1e-9);
        assert!(stats.average_n_stocks.is_none());
    }

    #[test]
    fn test_against_itself() {
        let m = series("M", &[0.01, -0.02, 0.015, 0.03, -0.005]);
        let stats = market_relative_statistics(&m, &m);
        assert_relative_eq!(stats.beta.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(stats.correlation.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(stats.alpha.unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(stats.tracking_error.unwrap(), 0.0, epsilon = 1e-12);
        assert!(stats.information_ratio.is_none());
    }

    #[test]
    fn test_empty_intersection_leaves_everything_undefined() {
        let a = series("A", &[0.01, 0.02]);
        let m = ReturnSeries::new("M", vec![month(5), month(6)], vec![0.01, 0.02]).unwrap();
        let stats = market_relative_statistics(&a, &m);
        assert_eq!(stats, SummaryStatistics::default());
        assert!(stats.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_flat_market_has_undefined_beta() {
        let a = series("A", &[0.01, 0.02, -0.01]);
        let m = series("M", &[0.01, 0.01, 0.01]);
        let stats = market_relative_statistics(&a, &m);
        assert!(stats.beta.is_none());
        assert!(stats.alpha.is_none());
        assert!(stats.correlation.is_none());
        assert!(stats.r_squared.is_none());
        assert!(stats.excess_return.is_some());
    }

    #[test]
    fn test_standalone_statistics() {
        let a = series("A", &[0.01, 0.02, -0.01, 0.03])
            .with_n_stocks(vec![100.0, 110.0, 120.0, 130.0])
            .unwrap();
        let stats = summary_statistics(&a);
        assert_relative_eq!(stats.mean_return.unwrap(), 0.15, epsilon = 1e-12);
        assert_relative_eq!(stats.average_n_stocks.unwrap(), 115.0);
        assert!(stats.beta.is_none());
        assert!(stats.excess_return.is_none());
        assert!(stats.information_ratio.is_none());
    }

    #[test]
    fn test_average_n_stocks_uses_aligned_rows() {
        let a = series("A", &[0.01, 0.02, -0.01, 0.03])
            .with_n_stocks(vec![100.0, 110.0, 120.0, 130.0])
            .unwrap();
        let m = ReturnSeries::new("M", vec![month(3), month(4)], vec![0.0, 0.01]).unwrap();
        let stats = market_relative_statistics(&a, &m);
        assert_eq!(stats.observations, 2);
        assert_relative_eq!(stats.average_n_stocks.unwrap(), 125.0);
    }

    #[test]
    fn test_zero_volatility_sharpe_is_undefined() {
        let stats = summary_statistics(&series("flat", &[0.01, 0.01, 0.01]));
        assert!(stats.mean_return.is_some());
        assert!(stats.sharpe_ratio.is_none());
    }

    #[test]
    fn test_metric_metadata() {
        assert_eq!(Metric::Alpha.label(), "Annual Alpha (%)");
        assert_eq!(Metric::Alpha.kind(), MetricKind::Percentage);
        assert_eq!(Metric::RSquared.kind(), MetricKind::Correlation);
        assert!(Metric::Beta.is_market_relative());
        assert!(!Metric::SharpeRatio.is_market_relative());
        assert_eq!(SummaryStatistics::default().iter().count(), Metric::ALL.len());
    }
}
