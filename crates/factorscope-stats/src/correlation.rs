//! Correlation matrices across return series.
//!
//! Each entry is the Pearson correlation over the dates both series share
//! (pairwise-complete observations).

use crate::align::AlignedPair;
use crate::moments::correlation;
use crate::series::ReturnSeries;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Symmetric matrix of pairwise correlations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Row and column labels.
    pub labels: Vec<String>,
    /// Correlations; `None` where fewer than two dates are shared or a side
    /// has zero variance.
    pub values: Array2<Option<f64>>,
}

impl CorrelationMatrix {
    /// Number of series.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Correlation between two labelled series.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == row)?;
        let j = self.labels.iter().position(|l| l == column)?;
        self.values[[i, j]]
    }
}

/// Pairwise-complete correlation matrix, labelled by series name.
pub fn correlation_matrix(series: &[ReturnSeries]) -> CorrelationMatrix {
    let n = series.len();
    let mut values = Array2::<Option<f64>>::from_elem((n, n), None);

    for i in 0..n {
        for j in i..n {
            let pair = AlignedPair::intersect(&series[i], &series[j]);
            let rho = correlation(pair.left(), pair.right());
            values[[i, j]] = rho;
            values[[j, i]] = rho;
        }
    }

    CorrelationMatrix {
        labels: series.iter().map(|s| s.name().to_string()).collect(),
        values,
    }
}

/// Correlations of each series' excess return over the market.
///
/// Every series is first reduced to `series - market` on its own common
/// dates with the market.
pub fn excess_return_correlation(series: &[ReturnSeries], market: &ReturnSeries) -> CorrelationMatrix {
    let excess: Vec<ReturnSeries> = series
        .iter()
        .map(|s| {
            let pair = AlignedPair::intersect(s, market);
            ReturnSeries::from_sorted(
                s.name().to_string(),
                pair.dates().to_vec(),
                pair.differences(),
                None,
            )
        })
        .collect();

    tracing::debug!(
        series = excess.len(),
        market = market.name(),
        "computing excess return correlations"
    );

    correlation_matrix(&excess)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series(name: &str, start: u32, values: &[f64]) -> ReturnSeries {
        let dates = (0..values.len() as u32)
            .map(|i| NaiveDate::from_ymd_opt(2020, start + i, 1).unwrap())
            .collect();
        ReturnSeries::new(name, dates, values.to_vec()).unwrap()
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let a = series("a", 1, &[0.01, 0.02, -0.01, 0.03]);
        let b = series("b", 1, &[0.005, 0.01, 0.0, 0.02]);
        let c = series("c", 1, &[-0.01, -0.02, 0.01, -0.03]);

        let matrix = correlation_matrix(&[a, b, c]);
        assert_eq!(matrix.len(), 3);
        for i in 0..3 {
            assert_relative_eq!(matrix.values[[i, i]].unwrap(), 1.0, epsilon = 1e-12);
        }
        assert_eq!(matrix.get("a", "b"), matrix.get("b", "a"));
        assert_relative_eq!(matrix.get("a", "b").unwrap(), 0.942_857_142_857_143_1, epsilon = 1e-9);
        assert_relative_eq!(matrix.get("a", "c").unwrap(), -1.0, epsilon = 1e-12);
        assert!(matrix.get("a", "zzz").is_none());
    }

    #[test]
    fn test_pairwise_complete_dates() {
        let a = series("a", 1, &[0.01, 0.02, -0.01, 0.03, 0.04]);
        // Overlaps a only on months 4 and 5
        let b = series("b", 4, &[0.01, 0.02, 0.03]);
        let c = series("c", 7, &[0.01, 0.02]);

        let matrix = correlation_matrix(&[a, b, c]);
        assert_relative_eq!(matrix.get("a", "b").unwrap(), 1.0, epsilon = 1e-12);
        assert!(matrix.get("a", "c").is_none());
    }

    #[test]
    fn test_excess_return_correlation() {
        let m = series("m", 1, &[0.01, 0.02, 0.03, 0.04]);
        // a - m = [0.01, 0.02, 0.03, 0.04]; b - m = [-0.01, -0.02, -0.03, -0.04]
        let a = series("a", 1, &[0.02, 0.04, 0.06, 0.08]);
        let b = series("b", 1, &[0.0, 0.0, 0.0, 0.0]);

        let matrix = excess_return_correlation(&[a, b], &m);
        assert_eq!(matrix.labels, vec!["a".to_string(), "b".to_string()]);
        assert_relative_eq!(matrix.get("a", "b").unwrap(), -1.0, epsilon = 1e-9);
    }
}
