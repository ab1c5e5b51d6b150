//! Cumulative total and excess return paths.

use crate::align::AlignedPair;
use crate::series::ReturnSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Running product of `1 + r`.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |value, r| {
            *value *= 1.0 + r;
            Some(*value)
        })
        .collect()
}

/// Running product of `1 + r` that skips undefined observations: the value
/// at a hole is `None` and the product resumes afterwards.
pub fn cumulative_returns_with_gaps(returns: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut value = 1.0;
    returns
        .iter()
        .map(|r| {
            r.map(|r| {
                value *= 1.0 + r;
                value
            })
        })
        .collect()
}

/// Growth of one unit over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeSeries {
    /// Name of the underlying series.
    pub name: String,
    /// Observation dates.
    pub dates: Vec<NaiveDate>,
    /// Cumulative value at each date.
    pub values: Vec<f64>,
}

impl CumulativeSeries {
    /// Total return over the whole path.
    pub fn total_return(&self) -> Option<f64> {
        self.values.last().map(|v| v - 1.0)
    }
}

/// Cumulative value of a return series.
pub fn cumulative_value(series: &ReturnSeries) -> CumulativeSeries {
    CumulativeSeries {
        name: series.name().to_string(),
        dates: series.dates().to_vec(),
        values: cumulative_returns(series.returns()),
    }
}

/// Cumulative value of `series - market` over their common dates.
pub fn excess_cumulative_returns(series: &ReturnSeries, market: &ReturnSeries) -> CumulativeSeries {
    let pair = AlignedPair::intersect(series, market);
    CumulativeSeries {
        name: series.name().to_string(),
        values: cumulative_returns(&pair.differences()),
        dates: pair.dates().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, m, 1).unwrap()
    }

    #[test]
    fn test_cumulative_returns() {
        let values = cumulative_returns(&[0.1, -0.1, 0.2]);
        assert_relative_eq!(values[0], 1.1);
        assert_relative_eq!(values[1], 0.99, epsilon = 1e-12);
        assert_relative_eq!(values[2], 1.188, epsilon = 1e-12);
    }

    #[test]
    fn test_gaps_are_skipped() {
        let values = cumulative_returns_with_gaps(&[Some(0.1), None, Some(0.1)]);
        assert_relative_eq!(values[0].unwrap(), 1.1);
        assert!(values[1].is_none());
        assert_relative_eq!(values[2].unwrap(), 1.21, epsilon = 1e-12);
    }

    #[test]
    fn test_excess_path_uses_common_dates() {
        let a = ReturnSeries::new("a", vec![month(1), month(2), month(3)], vec![0.03, 0.01, 0.02])
            .unwrap();
        let m = ReturnSeries::new("m", vec![month(2), month(3)], vec![0.01, -0.01]).unwrap();

        let path = excess_cumulative_returns(&a, &m);
        assert_eq!(path.dates, vec![month(2), month(3)]);
        assert_relative_eq!(path.values[0], 1.0);
        assert_relative_eq!(path.values[1], 1.03, epsilon = 1e-12);
        assert_relative_eq!(path.total_return().unwrap(), 0.03, epsilon = 1e-12);
    }
}
