//! Parsed factor portfolio files.
//!
//! A portfolio file holds one row per month and rank combination: a date
//! (`year` + `month`, or `date`), `ret_*` return columns, an optional
//! constituent count (`n_stocks` or `nstocks`) and `rank_*` bucket columns.
//! Other columns are ignored.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use factorscope_stats::{ReturnColumn, ReturnTable};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Rank column holding the market-capitalization bucket.
pub const MARKET_CAP_RANK: &str = "rank_ME";

const RETURN_PREFIX: &str = "ret_";
const RANK_PREFIX: &str = "rank_";
const COUNT_COLUMNS: [&str; 2] = ["n_stocks", "nstocks"];

/// Where the row date comes from.
#[derive(Debug, Clone, Copy)]
enum DateSource {
    YearMonth { year: usize, month: usize },
    Date(usize),
}

/// Column positions resolved once from the header.
#[derive(Debug)]
struct Layout {
    date: DateSource,
    returns: Vec<(usize, String)>,
    count: Option<usize>,
    ranks: Vec<(usize, String)>,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let date = match (find("year"), find("month"), find("date")) {
            (Some(year), Some(month), _) => DateSource::YearMonth { year, month },
            (_, _, Some(idx)) => DateSource::Date(idx),
            _ => return Err(DataError::MissingColumn("date (or year and month)".to_string())),
        };

        let prefixed = |prefix: &str| -> Vec<(usize, String)> {
            headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.trim().starts_with(prefix))
                .map(|(i, h)| (i, h.trim().to_string()))
                .collect()
        };

        let returns = prefixed(RETURN_PREFIX);
        if returns.is_empty() {
            return Err(DataError::MissingColumn(format!("{RETURN_PREFIX}*")));
        }

        Ok(Self {
            date,
            returns,
            count: COUNT_COLUMNS.iter().find_map(|c| find(c)),
            ranks: prefixed(RANK_PREFIX),
        })
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).map(str::trim).unwrap_or_default()
}

fn parse_float(value: &str, line: u64) -> Result<Option<f64>> {
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| DataError::Parse(format!("line {line}: invalid number {value:?}")))
}

/// Integer field; integral floats such as `3.0` are accepted.
fn parse_int(value: &str, line: u64) -> Result<Option<i64>> {
    match parse_float(value, line)? {
        Some(v) if v.fract() == 0.0 => Ok(Some(v as i64)),
        Some(_) => Err(DataError::Parse(format!("line {line}: expected an integer, got {value:?}"))),
        None => Ok(None),
    }
}

fn parse_date(record: &StringRecord, source: DateSource, line: u64) -> Result<NaiveDate> {
    match source {
        DateSource::YearMonth { year, month } => {
            let y = parse_int(field(record, year), line)?;
            let m = parse_int(field(record, month), line)?;
            y.zip(m)
                .and_then(|(y, m)| NaiveDate::from_ymd_opt(i32::try_from(y).ok()?, u32::try_from(m).ok()?, 1))
                .ok_or_else(|| DataError::Parse(format!("line {line}: invalid year/month")))
        }
        DateSource::Date(idx) => {
            let raw = field(record, idx);
            let day = raw.get(..10).unwrap_or(raw);
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map_err(|e| DataError::Parse(format!("line {line}: invalid date {raw:?}: {e}")))
        }
    }
}

/// One parsed column; `None` marks a blank or `NaN` cell.
#[derive(Debug, Clone, PartialEq)]
struct SparseColumn {
    name: String,
    values: Vec<Option<f64>>,
}

impl SparseColumn {
    /// Values at `rows`, or `None` if any of them is missing.
    fn take(&self, rows: &[usize]) -> Option<Vec<f64>> {
        rows.iter().map(|&i| self.values[i]).collect()
    }
}

/// All rows of one portfolio file, returns already fractional.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorFrame {
    dates: Vec<NaiveDate>,
    returns: Vec<SparseColumn>,
    n_stocks: Option<Vec<Option<f64>>>,
    ranks: BTreeMap<String, Vec<Option<i64>>>,
}

impl FactorFrame {
    /// Parse a portfolio file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not follow the
    /// portfolio layout.
    pub fn from_path(path: &Path, returns_in_percent: bool) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, returns_in_percent)
    }

    /// Parse portfolio CSV from any reader.
    ///
    /// Every dated row is kept. Blank return cells are recorded per column
    /// and only matter when that column is selected.
    ///
    /// # Errors
    /// Returns an error on malformed CSV, a missing date or return column, or
    /// an unparseable value.
    pub fn from_reader<R: Read>(reader: R, returns_in_percent: bool) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let layout = Layout::from_headers(rdr.headers()?)?;
        let scale = if returns_in_percent { 0.01 } else { 1.0 };

        let mut dates = Vec::new();
        let mut returns: Vec<Vec<Option<f64>>> = vec![Vec::new(); layout.returns.len()];
        let mut counts: Vec<Option<f64>> = Vec::new();
        let mut ranks: Vec<Vec<Option<i64>>> = vec![Vec::new(); layout.ranks.len()];

        for record in rdr.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());

            dates.push(parse_date(&record, layout.date, line)?);
            for (column, (idx, _)) in returns.iter_mut().zip(&layout.returns) {
                column.push(parse_float(field(&record, *idx), line)?.map(|r| r * scale));
            }
            if let Some(idx) = layout.count {
                counts.push(parse_float(field(&record, idx), line)?);
            }
            for (column, (idx, _)) in ranks.iter_mut().zip(&layout.ranks) {
                column.push(parse_int(field(&record, *idx), line)?);
            }
        }

        let returns: Vec<SparseColumn> = layout
            .returns
            .into_iter()
            .zip(returns)
            .map(|((_, name), values)| SparseColumn { name, values })
            .collect();
        for column in &returns {
            let gaps = column.values.iter().filter(|v| v.is_none()).count();
            if gaps > 0 {
                tracing::debug!(column = %column.name, gaps, "return column has blank cells");
            }
        }

        Ok(Self {
            dates,
            returns,
            n_stocks: layout.count.map(|_| counts),
            ranks: layout
                .ranks
                .into_iter()
                .zip(ranks)
                .map(|((_, name), values)| (name, values))
                .collect(),
        })
    }

    /// Number of rows.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the file had no usable rows.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Row dates, in file order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Names of the return columns.
    pub fn return_columns(&self) -> impl Iterator<Item = &str> {
        self.returns.iter().map(|c| c.name.as_str())
    }

    /// Names of the rank columns.
    pub fn rank_columns(&self) -> impl Iterator<Item = &str> {
        self.ranks.keys().map(String::as_str)
    }

    /// Whether the file has a constituent count column.
    pub const fn has_n_stocks(&self) -> bool {
        self.n_stocks.is_some()
    }

    /// Distinct values of a rank column, ascending.
    pub fn rank_values(&self, column: &str) -> Option<Vec<i64>> {
        let values = self.ranks.get(column)?;
        let distinct: BTreeSet<i64> = values.iter().flatten().copied().collect();
        Some(distinct.into_iter().collect())
    }

    /// Rows matching every `rank column = value` filter, sorted by date.
    fn rows(&self, label: &str, filters: &BTreeMap<String, i64>) -> Result<Vec<usize>> {
        let mut keep: Vec<usize> = (0..self.len()).collect();
        for (column, value) in filters {
            let ranks = self
                .ranks
                .get(column)
                .ok_or_else(|| DataError::MissingColumn(column.clone()))?;
            keep.retain(|&i| ranks[i] == Some(*value));
        }

        keep.sort_by_key(|&i| self.dates[i]);
        if keep.windows(2).any(|w| self.dates[w[0]] == self.dates[w[1]]) {
            return Err(DataError::AmbiguousSelection(label.to_string()));
        }
        Ok(keep)
    }

    /// Build a table over `rows` from the given columns. A column with a gap
    /// on those rows is left out; so is a count column with a gap.
    fn table(&self, label: &str, rows: &[usize], columns: &[&SparseColumn]) -> Result<ReturnTable> {
        let mut complete = Vec::with_capacity(columns.len());
        for column in columns {
            match column.take(rows) {
                Some(values) => complete.push(ReturnColumn::new(column.name.clone(), values)),
                None => tracing::warn!(
                    label,
                    column = %column.name,
                    "return column has gaps in this selection, select it on its own"
                ),
            }
        }

        tracing::debug!(label, rows = rows.len(), columns = complete.len(), "selected rows");

        let table = ReturnTable::new(rows.iter().map(|&i| self.dates[i]).collect(), complete)?;
        let counts = self
            .n_stocks
            .as_ref()
            .and_then(|counts| rows.iter().map(|&i| counts[i]).collect::<Option<Vec<f64>>>());
        Ok(match counts {
            Some(counts) => table.with_n_stocks(counts)?,
            None => table,
        })
    }

    /// Rows matching every `rank column = value` filter, sorted by date,
    /// with every return column that has no gap on those rows.
    ///
    /// # Errors
    /// Returns [`DataError::MissingColumn`] for an unknown rank column and
    /// [`DataError::AmbiguousSelection`] if a month still has several rows.
    pub fn select(&self, label: &str, filters: &BTreeMap<String, i64>) -> Result<ReturnTable> {
        let rows = self.rows(label, filters)?;
        let columns: Vec<&SparseColumn> = self.returns.iter().collect();
        self.table(label, &rows, &columns)
    }

    /// Like [`select`](Self::select) but projected onto one return column.
    /// Months where that column is blank are dropped; blanks in other
    /// columns do not affect the result.
    ///
    /// # Errors
    /// Returns [`DataError::MissingColumn`] for an unknown rank or return
    /// column and [`DataError::AmbiguousSelection`] if a month still has
    /// several rows.
    pub fn select_column(
        &self,
        label: &str,
        filters: &BTreeMap<String, i64>,
        column: &str,
    ) -> Result<ReturnTable> {
        let returns = self
            .returns
            .iter()
            .find(|c| c.name == column)
            .ok_or_else(|| DataError::MissingColumn(column.to_string()))?;
        let mut rows = self.rows(label, filters)?;
        let before = rows.len();
        rows.retain(|&i| returns.values[i].is_some());
        if rows.len() < before {
            tracing::debug!(label, column, dropped = before - rows.len(), "skipped blank months");
        }
        self.table(label, &rows, &[returns])
    }
}
