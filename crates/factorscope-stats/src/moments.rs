//! Sample moments and guarded ratios.
//!
//! Variances, covariances and standard deviations use the sample (n - 1)
//! denominator. Skewness and kurtosis are the bias-corrected sample
//! estimators (adjusted Fisher-Pearson G1 and excess kurtosis G2), matching
//! the conventions of common dataframe libraries.
//!
//! Every function returns `None` when the statistic is undefined: too few
//! observations, or a denominator that vanishes.
//!
//! A dispersion is zero when it is rounding noise relative to the inputs:
//! a variance at or below `(RELATIVE_TOLERANCE * max |x|)^2` is reported as
//! exactly `0.0`. Small returns with genuine variation keep their spread.

/// Relative spread below which a series counts as constant.
pub const RELATIVE_TOLERANCE: f64 = 1e-10;

/// Divide, or `None` when the denominator is zero or either operand is not
/// finite.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if !numerator.is_finite() || !denominator.is_finite() || denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Variance-scale cutoff for `values`.
fn noise_floor(values: &[f64]) -> f64 {
    let scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    (RELATIVE_TOLERANCE * scale).powi(2)
}

/// `variance`, or exactly zero when it is rounding noise.
fn snap(variance: f64, values: &[f64]) -> f64 {
    if variance <= noise_floor(values) { 0.0 } else { variance }
}

/// Scale a per-period mean to annual terms.
pub fn annualize_mean(mean: f64, periods_per_year: u32) -> f64 {
    mean * f64::from(periods_per_year)
}

/// Scale a per-period volatility to annual terms.
pub fn annualize_volatility(std_dev: f64, periods_per_year: u32) -> f64 {
    std_dev * f64::from(periods_per_year).sqrt()
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance.
pub fn variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(snap(ss / (n - 1) as f64, values))
}

/// Sample standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// Sample covariance of two equally long slices.
pub fn covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let cross: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    Some(cross / (n - 1) as f64)
}

/// Pearson correlation.
pub fn correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let cov = covariance(x, y)?;
    let sx = std_dev(x)?;
    let sy = std_dev(y)?;
    ratio(cov, sx * sy)
}

/// Central moments m2 and m_k with the population (1/n) denominator.
fn central_moments(values: &[f64], k: i32) -> Option<(f64, f64)> {
    let n = values.len() as f64;
    let m = mean(values)?;
    let m2 = snap(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n, values);
    let mk = values.iter().map(|v| (v - m).powi(k)).sum::<f64>() / n;
    Some((m2, mk))
}

/// Population skewness g1 = m3 / m2^1.5, without bias correction.
pub fn population_skewness(values: &[f64]) -> Option<f64> {
    let (m2, m3) = central_moments(values, 3)?;
    ratio(m3, m2.powf(1.5))
}

/// Population excess kurtosis g2 = m4 / m2^2 - 3, without bias correction.
pub fn population_excess_kurtosis(values: &[f64]) -> Option<f64> {
    let (m2, m4) = central_moments(values, 4)?;
    Some(ratio(m4, m2 * m2)? - 3.0)
}

/// Bias-corrected sample skewness (G1). Needs at least 3 observations.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let g1 = population_skewness(values)?;
    let n = n as f64;
    Some((n * (n - 1.0)).sqrt() / (n - 2.0) * g1)
}

/// Bias-corrected sample excess kurtosis (G2). Needs at least 4 observations.
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let g2 = population_excess_kurtosis(values)?;
    let n = n as f64;
    Some((n - 1.0) / ((n - 2.0) * (n - 3.0)) * ((n + 1.0) * g2 + 6.0))
}
