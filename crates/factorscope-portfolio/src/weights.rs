//! Portfolio weights.

use crate::error::{PortfolioError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Non-negative weights per series identifier, normalized to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioWeights {
    weights: BTreeMap<String, f64>,
}

impl PortfolioWeights {
    /// Validate and normalize raw weights.
    ///
    /// Weights are rescaled by their sum, so `{A: 2, B: 2}` equals
    /// `{A: 1, B: 1}`.
    ///
    /// # Errors
    /// Returns [`PortfolioError::NoSeries`] for an empty map and
    /// [`PortfolioError::InvalidWeights`] for negative or non-finite weights
    /// or a zero sum.
    pub fn new<I, K>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let raw: BTreeMap<String, f64> = weights.into_iter().map(|(k, w)| (k.into(), w)).collect();
        if raw.is_empty() {
            return Err(PortfolioError::NoSeries);
        }
        if let Some((id, w)) = raw.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(PortfolioError::InvalidWeights(format!(
                "weight for {id} must be a non-negative number, got {w}"
            )));
        }

        // Scale by the largest weight first so the sum cannot overflow
        let largest = raw.values().copied().fold(0.0_f64, f64::max);
        if largest <= 0.0 {
            return Err(PortfolioError::InvalidWeights(
                "weights sum to zero".to_string(),
            ));
        }
        let total: f64 = raw.values().map(|w| w / largest).sum();

        Ok(Self {
            weights: raw
                .into_iter()
                .map(|(k, w)| (k, w / largest / total))
                .collect(),
        })
    }

    /// Equal weight `1 / N` for each identifier.
    ///
    /// # Errors
    /// Returns [`PortfolioError::NoSeries`] when no identifier is given.
    pub fn equal<I, K>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::new(ids.into_iter().map(|id| (id, 1.0)))
    }

    /// Normalized weight of a series.
    pub fn get(&self, id: &str) -> Option<f64> {
        self.weights.get(id).copied()
    }

    /// Iterate over `(identifier, weight)` in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, w)| (k.as_str(), *w))
    }

    /// Series identifiers.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    /// Number of weighted series.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether no series is weighted.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_equal_weights() {
        let weights = PortfolioWeights::equal(["a", "b", "c", "d"]).unwrap();
        assert_eq!(weights.len(), 4);
        for (_, w) in weights.iter() {
            assert_relative_eq!(w, 0.25);
        }
    }

    #[test]
    fn test_normalization_is_scale_invariant() {
        let doubled = PortfolioWeights::new([("a", 2.0), ("b", 2.0)]).unwrap();
        let unit = PortfolioWeights::new([("a", 1.0), ("b", 1.0)]).unwrap();
        assert_eq!(doubled, unit);

        let skewed = PortfolioWeights::new([("a", 3.0), ("b", 1.0)]).unwrap();
        assert_relative_eq!(skewed.get("a").unwrap(), 0.75);
        assert_relative_eq!(skewed.iter().map(|(_, w)| w).sum::<f64>(), 1.0);
    }

    #[test]
    fn test_zero_weight_is_allowed_alongside_positive() {
        let weights = PortfolioWeights::new([("a", 0.0), ("b", 5.0)]).unwrap();
        assert_eq!(weights.get("a"), Some(0.0));
        assert_eq!(weights.get("b"), Some(1.0));
    }

    #[rstest]
    #[case(1e308)]
    #[case(f64::MAX)]
    #[case(1e-300)]
    fn test_extreme_magnitudes_still_sum_to_one(#[case] w: f64) {
        let weights = PortfolioWeights::new([("a", w), ("b", w), ("c", w / 2.0)]).unwrap();
        assert_relative_eq!(weights.get("a").unwrap(), 0.4);
        assert_relative_eq!(weights.get("c").unwrap(), 0.2);
        assert_relative_eq!(weights.iter().map(|(_, w)| w).sum::<f64>(), 1.0);
    }

    #[rstest]
    #[case(vec![("a", 0.0), ("b", 0.0)])]
    #[case(vec![("a", -0.5), ("b", 1.5)])]
    #[case(vec![("a", f64::NAN)])]
    #[case(vec![("a", f64::INFINITY)])]
    fn test_invalid_weights(#[case] raw: Vec<(&str, f64)>) {
        assert!(matches!(
            PortfolioWeights::new(raw),
            Err(PortfolioError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_empty_weights() {
        let empty: Vec<(&str, f64)> = Vec::new();
        assert_eq!(
            PortfolioWeights::new(empty).unwrap_err(),
            PortfolioError::NoSeries
        );
    }
}
