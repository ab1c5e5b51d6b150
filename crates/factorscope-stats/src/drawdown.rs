//! Drawdown from running peak.

use crate::performance::cumulative_returns;
use crate::series::ReturnSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cumulative value, running peak and drawdown per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownSeries {
    /// Source dates.
    pub dates: Vec<NaiveDate>,
    /// Growth of one unit invested at the start.
    pub cumulative_value: Vec<f64>,
    /// Highest cumulative value reached so far.
    pub running_peak: Vec<f64>,
    /// Fractional decline from the running peak; never positive.
    /// `None` only while the running peak is not positive.
    pub drawdown: Vec<Option<f64>>,
}

impl DrawdownSeries {
    /// Deepest drawdown over the whole series.
    pub fn max_drawdown(&self) -> Option<f64> {
        self.drawdown.iter().flatten().copied().reduce(f64::min)
    }

    /// Date on which the deepest drawdown was reached.
    pub fn max_drawdown_date(&self) -> Option<NaiveDate> {
        let deepest = self.max_drawdown()?;
        self.drawdown
            .iter()
            .position(|d| *d == Some(deepest))
            .map(|i| self.dates[i])
    }

    /// Drawdown at the last date.
    pub fn current(&self) -> Option<f64> {
        self.drawdown.last().copied().flatten()
    }
}

/// Drawdown of a return series.
///
/// `cumulative_value[i]` is the product of `1 + r` up to and including `i`,
/// `running_peak[i]` its running maximum and
/// `drawdown[i] = (cumulative_value[i] - running_peak[i]) / running_peak[i]`.
pub fn drawdown(series: &ReturnSeries) -> DrawdownSeries {
    let cumulative_value = cumulative_returns(series.returns());

    let mut running_peak = Vec::with_capacity(cumulative_value.len());
    let mut peak = f64::NEG_INFINITY;
    for &value in &cumulative_value {
        peak = peak.max(value);
        running_peak.push(peak);
    }

    let drawdown = cumulative_value
        .iter()
        .zip(&running_peak)
        .map(|(&value, &peak)| (peak > 0.0).then(|| (value - peak) / peak))
        .collect();

    DrawdownSeries {
        dates: series.dates().to_vec(),
        cumulative_value,
        running_peak,
        drawdown,
    }
}
