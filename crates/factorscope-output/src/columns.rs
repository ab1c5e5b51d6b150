//! Date-keyed columnar view shared by the exporters and DataFrame conversion.

use chrono::NaiveDate;
use factorscope_portfolio::BlendedSeries;
use factorscope_stats::{
    CumulativeSeries, DrawdownSeries, RelativeStats, ReturnSeries, ReturnTable, RollingStats,
};

/// Named nullable float columns on a date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedColumns<'a> {
    /// Row dates.
    pub dates: &'a [NaiveDate],
    /// `(name, values)` with one value per date.
    pub columns: Vec<(String, Vec<Option<f64>>)>,
}

impl<'a> DatedColumns<'a> {
    /// View with no columns yet.
    pub const fn new(dates: &'a [NaiveDate]) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    /// Append a column of defined values.
    pub fn with_values(mut self, name: impl Into<String>, values: &[f64]) -> Self {
        self.columns
            .push((name.into(), values.iter().copied().map(Some).collect()));
        self
    }

    /// Append a nullable column.
    pub fn with_optional(mut self, name: impl Into<String>, values: &[Option<f64>]) -> Self {
        self.columns.push((name.into(), values.to_vec()));
        self
    }

    /// Column names, without the date column.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
}

/// Results that can be laid out as date-keyed columns.
pub trait Columnar {
    /// Columnar view of the result.
    fn dated_columns(&self) -> DatedColumns<'_>;
}

impl Columnar for RollingStats {
    fn dated_columns(&self) -> DatedColumns<'_> {
        DatedColumns::new(&self.dates)
            .with_optional("rolling_mean", &self.rolling_mean)
            .with_optional("rolling_std", &self.rolling_std)
            .with_optional("rolling_sharpe", &self.rolling_sharpe)
    }
}

impl Columnar for DrawdownSeries {
    fn dated_columns(&self) -> DatedColumns<'_> {
        DatedColumns::new(&self.dates)
            .with_values("cumulative_value", &self.cumulative_value)
            .with_values("running_peak", &self.running_peak)
            .with_optional("drawdown", &self.drawdown)
    }
}

impl Columnar for RelativeStats {
    fn dated_columns(&self) -> DatedColumns<'_> {
        DatedColumns::new(&self.dates)
            .with_optional("portfolio_value", &self.portfolio_value)
            .with_optional("market_value", &self.market_value)
            .with_optional("rolling_alpha", &self.rolling_alpha)
            .with_optional("rolling_beta", &self.rolling_beta)
            .with_optional("tracking_error", &self.tracking_error)
            .with_optional("information_ratio", &self.information_ratio)
    }
}

impl Columnar for CumulativeSeries {
    fn dated_columns(&self) -> DatedColumns<'_> {
        DatedColumns::new(&self.dates).with_values(self.name.clone(), &self.values)
    }
}

impl Columnar for ReturnSeries {
    fn dated_columns(&self) -> DatedColumns<'_> {
        let view = DatedColumns::new(self.dates()).with_values(self.name(), self.returns());
        match self.n_stocks() {
            Some(counts) => view.with_values("n_stocks", counts),
            None => view,
        }
    }
}

impl Columnar for ReturnTable {
    fn dated_columns(&self) -> DatedColumns<'_> {
        let view = self
            .columns()
            .iter()
            .fold(DatedColumns::new(self.dates()), |view, c| {
                view.with_values(c.name.clone(), &c.values)
            });
        match self.n_stocks() {
            Some(counts) => view.with_values("n_stocks", counts),
            None => view,
        }
    }
}

impl Columnar for BlendedSeries {
    fn dated_columns(&self) -> DatedColumns<'_> {
        self.table
            .dated_columns()
            .with_values("cumulative_return", &self.cumulative_return)
    }
}
