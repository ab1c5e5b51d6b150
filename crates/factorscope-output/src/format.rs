//! Display formatting for metric values.
//!
//! Undefined or non-finite values render as [`NOT_AVAILABLE`].

use factorscope_stats::{Metric, MetricKind};

/// Placeholder for undefined values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Insert `,` every three digits of an unsigned integer string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Fixed-point number with thousands separators, e.g. `-1,234.57`.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let sign = if value < 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{}", group_thousands(int))
    } else {
        format!("{sign}{}.{frac}", group_thousands(int))
    }
}

/// Fraction shown as a percentage with two decimals, e.g. `0.1234` as `12.34%`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{}%", format_number(value * 100.0, 2))
}

/// Count truncated to an integer, e.g. `1234.9` as `1,234`.
pub fn format_count(value: f64) -> String {
    format_number(value.trunc(), 0)
}

/// Format a value by display category.
pub fn format_value(kind: MetricKind, value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    match kind {
        MetricKind::Percentage => format_percent(value),
        MetricKind::Ratio => format_number(value, 2),
        MetricKind::Correlation | MetricKind::Distribution => format_number(value, 3),
        MetricKind::Count => format_count(value),
    }
}

/// Format a summary metric.
pub fn format_metric(metric: Metric, value: Option<f64>) -> String {
    format_value(metric.kind(), value)
}
