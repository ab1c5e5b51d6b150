//! Monthly return series and tables.
//!
//! A [`ReturnTable`] is what the series store hands to the engine: one date
//! column, one or more `ret_*` return columns and an optional constituent
//! count. A [`ReturnSeries`] is the single-column projection the statistics
//! routines operate on. Both enforce unique, strictly increasing dates.

use crate::error::{Result, StatsError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Check that dates are unique and strictly increasing.
fn check_dates(dates: &[NaiveDate]) -> Result<()> {
    match dates.windows(2).position(|w| w[0] >= w[1]) {
        Some(pos) => Err(StatsError::UnsortedDates { index: pos + 1 }),
        None => Ok(()),
    }
}

const fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(StatsError::LengthMismatch { expected, actual })
    }
}

/// Indices of `dates` falling inside the inclusive range.
fn indices_between(
    dates: &[NaiveDate],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<usize> {
    dates
        .iter()
        .enumerate()
        .filter(|(_, d)| start.is_none_or(|s| **d >= s) && end.is_none_or(|e| **d <= e))
        .map(|(i, _)| i)
        .collect()
}

fn take<T: Copy>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i]).collect()
}

/// Serialized form of a [`ReturnSeries`], checked on the way in.
#[derive(Debug, Deserialize)]
struct RawSeries {
    name: String,
    dates: Vec<NaiveDate>,
    returns: Vec<f64>,
    #[serde(default)]
    n_stocks: Option<Vec<f64>>,
}

impl TryFrom<RawSeries> for ReturnSeries {
    type Error = StatsError;

    fn try_from(raw: RawSeries) -> Result<Self> {
        let series = Self::new(raw.name, raw.dates, raw.returns)?;
        match raw.n_stocks {
            Some(n_stocks) => series.with_n_stocks(n_stocks),
            None => Ok(series),
        }
    }
}

/// Ordered monthly observations of one fractional return column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct ReturnSeries {
    name: String,
    dates: Vec<NaiveDate>,
    returns: Vec<f64>,
    n_stocks: Option<Vec<f64>>,
}

impl ReturnSeries {
    /// Create a series from parallel date and return vectors.
    ///
    /// # Errors
    /// Returns an error if the lengths differ or the dates are not strictly
    /// increasing.
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, returns: Vec<f64>) -> Result<Self> {
        check_len(dates.len(), returns.len())?;
        check_dates(&dates)?;
        Ok(Self {
            name: name.into(),
            dates,
            returns,
            n_stocks: None,
        })
    }

    /// Create a series from `(date, return)` pairs.
    ///
    /// # Errors
    /// Returns an error if the dates are not strictly increasing.
    pub fn from_pairs(
        name: impl Into<String>,
        pairs: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self> {
        let (dates, returns) = pairs.into_iter().unzip();
        Self::new(name, dates, returns)
    }

    /// Built from data already known to satisfy the date invariant.
    pub(crate) const fn from_sorted(
        name: String,
        dates: Vec<NaiveDate>,
        returns: Vec<f64>,
        n_stocks: Option<Vec<f64>>,
    ) -> Self {
        Self {
            name,
            dates,
            returns,
            n_stocks,
        }
    }

    /// Attach the per-month constituent count.
    ///
    /// # Errors
    /// Returns an error if the count column length differs from the series.
    pub fn with_n_stocks(mut self, n_stocks: Vec<f64>) -> Result<Self> {
        check_len(self.dates.len(), n_stocks.len())?;
        self.n_stocks = Some(n_stocks);
        Ok(self)
    }

    /// Rename the series.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Series identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observation dates.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Fractional monthly returns.
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Constituent counts, if the source supplied them.
    pub fn n_stocks(&self) -> Option<&[f64]> {
        self.n_stocks.as_deref()
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First observation date.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last observation date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Return observed at `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|i| self.returns[i])
    }

    /// Iterate over `(date, return)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.returns.iter().copied())
    }

    /// Copy of the observations within the inclusive date range.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let idx = indices_between(&self.dates, start, end);
        Self {
            name: self.name.clone(),
            dates: take(&self.dates, &idx),
            returns: take(&self.returns, &idx),
            n_stocks: self.n_stocks.as_deref().map(|n| take(n, &idx)),
        }
    }
}

/// A named return column of a [`ReturnTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnColumn {
    /// Column name, e.g. `ret_vw`.
    pub name: String,
    /// Fractional monthly returns, one per table date.
    pub values: Vec<f64>,
}

impl ReturnColumn {
    /// Create a new column.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Serialized form of a [`ReturnTable`], checked on the way in.
#[derive(Debug, Deserialize)]
struct RawTable {
    dates: Vec<NaiveDate>,
    columns: Vec<ReturnColumn>,
    #[serde(default)]
    n_stocks: Option<Vec<f64>>,
}

impl TryFrom<RawTable> for ReturnTable {
    type Error = StatsError;

    fn try_from(raw: RawTable) -> Result<Self> {
        let table = Self::new(raw.dates, raw.columns)?;
        match raw.n_stocks {
            Some(n_stocks) => table.with_n_stocks(n_stocks),
            None => Ok(table),
        }
    }
}

/// Monthly observations of one or more return columns sharing a date axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct ReturnTable {
    dates: Vec<NaiveDate>,
    columns: Vec<ReturnColumn>,
    n_stocks: Option<Vec<f64>>,
}

impl ReturnTable {
    /// Create a table; column order is preserved.
    ///
    /// # Errors
    /// Returns an error on unsorted dates, a column of the wrong length, or a
    /// repeated column name.
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<ReturnColumn>) -> Result<Self> {
        check_dates(&dates)?;
        for (i, column) in columns.iter().enumerate() {
            check_len(dates.len(), column.values.len())?;
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(StatsError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            dates,
            columns,
            n_stocks: None,
        })
    }

    /// Attach the per-month constituent count.
    ///
    /// # Errors
    /// Returns an error if the count column length differs from the table.
    pub fn with_n_stocks(mut self, n_stocks: Vec<f64>) -> Result<Self> {
        check_len(self.dates.len(), n_stocks.len())?;
        self.n_stocks = Some(n_stocks);
        Ok(self)
    }

    /// Observation dates.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Return columns in source order.
    pub fn columns(&self) -> &[ReturnColumn] {
        &self.columns
    }

    /// Names of the return columns in source order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Values of the named return column.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Constituent counts, if present.
    pub fn n_stocks(&self) -> Option<&[f64]> {
        self.n_stocks.as_deref()
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no observations.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First observation date.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last observation date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Project one return column into a named [`ReturnSeries`].
    ///
    /// # Errors
    /// Returns [`StatsError::UnknownColumn`] if the column is absent.
    pub fn series(&self, name: impl Into<String>, column: &str) -> Result<ReturnSeries> {
        let values = self
            .column(column)
            .ok_or_else(|| StatsError::UnknownColumn(column.to_string()))?;
        Ok(ReturnSeries::from_sorted(
            name.into(),
            self.dates.clone(),
            values.to_vec(),
            self.n_stocks.clone(),
        ))
    }

    /// Copy of the observations within the inclusive date range.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let idx = indices_between(&self.dates, start, end);
        Self {
            dates: take(&self.dates, &idx),
            columns: self
                .columns
                .iter()
                .map(|c| ReturnColumn::new(c.name.clone(), take(&c.values, &idx)))
                .collect(),
            n_stocks: self.n_stocks.as_deref().map(|n| take(n, &idx)),
        }
    }
}

impl From<ReturnSeries> for ReturnTable {
    /// Single-column table named after the series.
    fn from(series: ReturnSeries) -> Self {
        Self {
            dates: series.dates,
            columns: vec![ReturnColumn::new(series.name, series.returns)],
            n_stocks: series.n_stocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    #[test]
    fn test_series_rejects_unsorted_dates() {
        let err = ReturnSeries::new(
            "a",
            vec![month(2020, 1), month(2020, 3), month(2020, 2)],
            vec![0.01, 0.02, 0.03],
        )
        .unwrap_err();
        assert_eq!(err, StatsError::UnsortedDates { index: 2 });
    }

    #[test]
    fn test_deserialize_checks_dates_and_lengths() {
        let series = ReturnSeries::new("a", vec![month(2020, 1), month(2020, 2)], vec![0.01, 0.02])
            .unwrap()
            .with_n_stocks(vec![10.0, 11.0])
            .unwrap();
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(serde_json::from_str::<ReturnSeries>(&json).unwrap(), series);

        let unsorted = r#"{"name":"a","dates":["2020-02-01","2020-01-01"],"returns":[0.01,0.02],"n_stocks":null}"#;
        let err = serde_json::from_str::<ReturnSeries>(unsorted).unwrap_err();
        assert!(err.to_string().contains("index 1"), "{err}");

        let short_count = r#"{"name":"a","dates":["2020-01-01"],"returns":[0.01],"n_stocks":[1.0,2.0]}"#;
        assert!(serde_json::from_str::<ReturnSeries>(short_count).is_err());

        let table = r#"{"dates":["2020-01-01","2020-01-01"],"columns":[{"name":"ret_vw","values":[0.1,0.2]}]}"#;
        assert!(serde_json::from_str::<ReturnTable>(table).is_err());
        let ragged = r#"{"dates":["2020-01-01"],"columns":[{"name":"ret_vw","values":[0.1,0.2]}]}"#;
        assert!(serde_json::from_str::<ReturnTable>(ragged).is_err());
    }

    #[test]
    fn test_series_rejects_duplicate_dates() {
        let err = ReturnSeries::new("a", vec![month(2020, 1), month(2020, 1)], vec![0.0, 0.0])
            .unwrap_err();
        assert_eq!(err, StatsError::UnsortedDates { index: 1 });
    }

    #[test]
    fn test_series_rejects_length_mismatch() {
        let err = ReturnSeries::new("a", vec![month(2020, 1)], vec![0.0, 0.1]).unwrap_err();
        assert_eq!(
            err,
            StatsError::LengthMismatch {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_series_between_is_inclusive() {
        let series = ReturnSeries::new(
            "a",
            (1..=6).map(|m| month(2021, m)).collect(),
            vec![0.01, 0.02, 0.03, 0.04, 0.05, 0.06],
        )
        .unwrap()
        .with_n_stocks(vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0])
        .unwrap();

        let clipped = series.between(Some(month(2021, 2)), Some(month(2021, 4)));
        assert_eq!(clipped.dates(), &[month(2021, 2), month(2021, 3), month(2021, 4)]);
        assert_eq!(clipped.returns(), &[0.02, 0.03, 0.04]);
        assert_eq!(clipped.n_stocks(), Some(&[11.0, 12.0, 13.0][..]));
        // Source untouched
        assert_eq!(series.len(), 6);
    }

    #[test]
    fn test_series_get() {
        let series =
            ReturnSeries::from_pairs("a", [(month(2020, 1), 0.01), (month(2020, 2), -0.02)])
                .unwrap();
        assert_eq!(series.get(month(2020, 2)), Some(-0.02));
        assert_eq!(series.get(month(2020, 3)), None);
    }

    #[test]
    fn test_table_projection() {
        let table = ReturnTable::new(
            vec![month(2020, 1), month(2020, 2)],
            vec![
                ReturnColumn::new("ret_vw", vec![0.01, 0.02]),
                ReturnColumn::new("ret_ew", vec![0.03, 0.04]),
            ],
        )
        .unwrap()
        .with_n_stocks(vec![100.0, 102.0])
        .unwrap();

        assert_eq!(table.column_names().collect::<Vec<_>>(), ["ret_vw", "ret_ew"]);
        let series = table.series("momentum/r11_1", "ret_ew").unwrap();
        assert_eq!(series.name(), "momentum/r11_1");
        assert_eq!(series.returns(), &[0.03, 0.04]);
        assert_eq!(series.n_stocks(), Some(&[100.0, 102.0][..]));

        assert_eq!(
            table.series("x", "ret_xx").unwrap_err(),
            StatsError::UnknownColumn("ret_xx".to_string())
        );
    }

    #[test]
    fn test_table_rejects_duplicate_column() {
        let err = ReturnTable::new(
            vec![month(2020, 1)],
            vec![
                ReturnColumn::new("ret_vw", vec![0.01]),
                ReturnColumn::new("ret_vw", vec![0.02]),
            ],
        )
        .unwrap_err();
        assert_eq!(err, StatsError::DuplicateColumn("ret_vw".to_string()));
    }

    #[test]
    fn test_table_from_series() {
        let series = ReturnSeries::from_pairs("ret_vw", [(month(2020, 1), 0.01)]).unwrap();
        let table = ReturnTable::from(series);
        assert_eq!(table.column("ret_vw"), Some(&[0.01][..]));
    }
}
