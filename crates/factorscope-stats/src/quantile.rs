//! Return distribution by quantile bucket.

use crate::error::{Result, StatsError};
use crate::moments::{mean, population_excess_kurtosis, population_skewness, std_dev};
use crate::series::ReturnSeries;
use serde::{Deserialize, Serialize};

/// Statistics of the returns falling in one quantile bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileBucket {
    /// 1-based bucket index, lowest returns first.
    pub quantile: usize,
    /// Lower bucket edge.
    pub lower: f64,
    /// Upper bucket edge.
    pub upper: f64,
    /// Number of observations in the bucket.
    pub count: usize,
    /// Mean return.
    pub mean: Option<f64>,
    /// Sample standard deviation.
    pub std_dev: Option<f64>,
    /// Population skewness (no bias correction).
    pub skewness: Option<f64>,
    /// Population excess kurtosis (no bias correction).
    pub kurtosis: Option<f64>,
}

/// Linear-interpolated quantile of sorted values.
fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Bucket edges at `k / n` for `k = 0..=n`.
fn bin_edges(sorted: &[f64], n_quantiles: usize) -> Vec<f64> {
    (0..=n_quantiles)
        .map(|k| interpolate(sorted, k as f64 / n_quantiles as f64))
        .collect()
}

/// Split returns into `n_quantiles` equal-count buckets.
///
/// The first bucket is closed on both ends, later buckets are `(lower, upper]`.
/// Bucket mean and standard deviation are sample statistics; skewness and
/// kurtosis are the population moments g1 and g2.
///
/// # Errors
/// Returns [`StatsError::InvalidQuantiles`] for zero buckets,
/// [`StatsError::EmptySeries`] for an empty series and
/// [`StatsError::DuplicateBinEdges`] when repeated values collapse two edges.
pub fn quantile_analysis(series: &ReturnSeries, n_quantiles: usize) -> Result<Vec<QuantileBucket>> {
    if n_quantiles == 0 {
        return Err(StatsError::InvalidQuantiles {
            requested: n_quantiles,
        });
    }
    if series.is_empty() {
        return Err(StatsError::EmptySeries);
    }

    let mut sorted = series.returns().to_vec();
    sorted.sort_by(f64::total_cmp);

    let edges = bin_edges(&sorted, n_quantiles);
    if edges.windows(2).any(|w| w[0] >= w[1]) {
        tracing::warn!(
            series = series.name(),
            n_quantiles,
            "quantile edges collapse on repeated values"
        );
        return Err(StatsError::DuplicateBinEdges);
    }

    let buckets = edges
        .windows(2)
        .enumerate()
        .map(|(k, w)| {
            let (lower, upper) = (w[0], w[1]);
            let values: Vec<f64> = sorted
                .iter()
                .copied()
                .filter(|&r| (r > lower || (k == 0 && r == lower)) && r <= upper)
                .collect();
            QuantileBucket {
                quantile: k + 1,
                lower,
                upper,
                count: values.len(),
                mean: mean(&values),
                std_dev: std_dev(&values),
                skewness: population_skewness(&values),
                kurtosis: population_excess_kurtosis(&values),
            }
        })
        .collect();

    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn series(values: &[f64]) -> ReturnSeries {
        let dates = (0..values.len())
            .map(|i| NaiveDate::from_ymd_opt(2000 + i as i32 / 12, i as u32 % 12 + 1, 1).unwrap())
            .collect();
        ReturnSeries::new("q", dates, values.to_vec()).unwrap()
    }

    #[test]
    fn test_equal_count_buckets() {
        let values: Vec<f64> = (1..=8).map(|i| i as f64 / 100.0).collect();
        let buckets = quantile_analysis(&series(&values), 4).unwrap();

        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 8);
        assert!(buckets.iter().all(|b| b.count == 2));
        assert_eq!(buckets[0].quantile, 1);
        assert_relative_eq!(buckets[0].lower, 0.01);
        assert_relative_eq!(buckets[3].upper, 0.08);
        assert_relative_eq!(buckets[0].mean.unwrap(), 0.015, epsilon = 1e-12);
        assert_relative_eq!(buckets[3].mean.unwrap(), 0.075, epsilon = 1e-12);
        // Two symmetric observations
        assert_relative_eq!(buckets[0].skewness.unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bucket_moments_are_population_moments() {
        let values = [0.03, -0.05, 0.06, -0.01, 0.0, 0.05, -0.03, 0.02, 0.01, 0.04];
        let buckets = quantile_analysis(&series(&values), 2).unwrap();

        assert_eq!(buckets[0].count, 5);
        assert_relative_eq!(buckets[0].upper, 0.015, epsilon = 1e-12);
        assert_relative_eq!(buckets[0].skewness.unwrap(), -0.403_407_114, epsilon = 1e-8);
        assert_relative_eq!(buckets[0].kurtosis.unwrap(), -1.236_325_803, epsilon = 1e-8);
        // Sample standard deviation, n - 1 denominator
        assert_relative_eq!(buckets[0].std_dev.unwrap(), (0.00232_f64 / 4.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(buckets[1].kurtosis.unwrap(), -1.3, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolated_edges() {
        let sorted = [0.0, 1.0, 2.0, 3.0, 4.0];
        let edges = bin_edges(&sorted, 2);
        assert_eq!(edges, vec![0.0, 2.0, 4.0]);

        let edges = bin_edges(&[0.0, 1.0], 4);
        assert_relative_eq!(edges[1], 0.25);
        assert_relative_eq!(edges[3], 0.75);
    }

    #[test]
    fn test_unsorted_input_is_bucketed_by_value() {
        let buckets = quantile_analysis(&series(&[0.05, -0.02, 0.01, 0.03, -0.04, 0.0]), 2).unwrap();
        assert_eq!(buckets[0].count, 3);
        assert_eq!(buckets[1].count, 3);
        assert!(buckets[0].mean.unwrap() < buckets[1].mean.unwrap());
    }

    #[rstest]
    #[case(0, StatsError::InvalidQuantiles { requested: 0 })]
    #[case(3, StatsError::DuplicateBinEdges)]
    fn test_errors(#[case] n: usize, #[case] expected: StatsError) {
        let flat = series(&[0.01, 0.01, 0.01, 0.01, 0.02]);
        assert_eq!(quantile_analysis(&flat, n).unwrap_err(), expected);
    }

    #[test]
    fn test_empty_series() {
        assert_eq!(
            quantile_analysis(&series(&[]), 5).unwrap_err(),
            StatsError::EmptySeries
        );
    }
}
