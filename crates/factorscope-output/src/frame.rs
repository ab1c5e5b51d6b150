//! Conversion of analysis results into polars DataFrames.

use crate::columns::{Columnar, DatedColumns};
use crate::table::StatisticsTable;
use factorscope_portfolio::BlendedSeries;
use factorscope_stats::{
    CorrelationMatrix, CumulativeSeries, DrawdownSeries, Metric, QuantileBucket, RelativeStats,
    ReturnSeries, ReturnTable, RollingStats,
};
use polars::prelude::*;

/// Results that can be materialized as a DataFrame.
pub trait ToFrame {
    /// Build a DataFrame of the result.
    ///
    /// # Errors
    ///
    /// Returns an error if polars rejects the columns.
    fn to_frame(&self) -> PolarsResult<DataFrame>;
}

fn dated_frame(view: DatedColumns<'_>) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(view.columns.len() + 1);
    columns.push(Series::new("date".into(), view.dates.to_vec()).into());
    for (name, values) in view.columns {
        columns.push(Series::new(name.into(), values).into());
    }
    DataFrame::new(columns)
}

macro_rules! columnar_frame {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToFrame for $ty {
                fn to_frame(&self) -> PolarsResult<DataFrame> {
                    dated_frame(self.dated_columns())
                }
            }
        )+
    };
}

columnar_frame!(
    RollingStats,
    DrawdownSeries,
    RelativeStats,
    CumulativeSeries,
    ReturnSeries,
    ReturnTable,
    BlendedSeries,
);

impl ToFrame for StatisticsTable {
    fn to_frame(&self) -> PolarsResult<DataFrame> {
        let labels: Vec<&str> = Metric::ALL.iter().map(|m| m.label()).collect();
        let mut columns: Vec<Column> = vec![Series::new("metric".into(), labels).into()];
        for (name, stats) in &self.columns {
            let values: Vec<Option<f64>> = Metric::ALL.iter().map(|&m| stats.get(m)).collect();
            columns.push(Series::new(name.as_str().into(), values).into());
        }
        DataFrame::new(columns)
    }
}

impl ToFrame for CorrelationMatrix {
    fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> =
            vec![Series::new("series".into(), self.labels.clone()).into()];
        for (label, column) in self.labels.iter().zip(self.values.columns()) {
            let values: Vec<Option<f64>> = column.iter().copied().collect();
            columns.push(Series::new(label.as_str().into(), values).into());
        }
        DataFrame::new(columns)
    }
}

impl ToFrame for Vec<QuantileBucket> {
    fn to_frame(&self) -> PolarsResult<DataFrame> {
        let quantiles: Vec<u32> = self.iter().map(|b| b.quantile as u32).collect();
        let counts: Vec<u32> = self.iter().map(|b| b.count as u32).collect();
        DataFrame::new(vec![
            Series::new("quantile".into(), quantiles).into(),
            Series::new("lower".into(), self.iter().map(|b| b.lower).collect::<Vec<_>>()).into(),
            Series::new("upper".into(), self.iter().map(|b| b.upper).collect::<Vec<_>>()).into(),
            Series::new("count".into(), counts).into(),
            Series::new("mean".into(), self.iter().map(|b| b.mean).collect::<Vec<_>>()).into(),
            Series::new("std_dev".into(), self.iter().map(|b| b.std_dev).collect::<Vec<_>>())
                .into(),
            Series::new("skewness".into(), self.iter().map(|b| b.skewness).collect::<Vec<_>>())
                .into(),
            Series::new("kurtosis".into(), self.iter().map(|b| b.kurtosis).collect::<Vec<_>>())
                .into(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use factorscope_stats::{SummaryStatistics, correlation_matrix, rolling_stats};

    fn series(name: &str, returns: Vec<f64>) -> ReturnSeries {
        let dates = (1..=returns.len() as u32)
            .map(|m| NaiveDate::from_ymd_opt(2023, m, 1).unwrap())
            .collect();
        ReturnSeries::new(name, dates, returns).unwrap()
    }

    #[test]
    fn test_rolling_frame_keeps_nulls() {
        let stats = rolling_stats(&series("bm", vec![0.1, -0.2, 0.05, 0.3]), 3).unwrap();
        let df = stats.to_frame().unwrap();

        assert_eq!(df.shape(), (4, 4));
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("rolling_mean").unwrap().null_count(), 2);
    }

    #[test]
    fn test_statistics_frame() {
        let table = StatisticsTable::new()
            .with_column("A", SummaryStatistics::default())
            .with_column("B", SummaryStatistics::default());
        let df = table.to_frame().unwrap();

        assert_eq!(df.shape(), (Metric::ALL.len(), 3));
        assert!(df.column("metric").is_ok());
        assert_eq!(df.column("B").unwrap().null_count(), Metric::ALL.len());
    }

    #[test]
    fn test_correlation_frame() {
        let a = series("a", vec![0.1, 0.2, 0.3]);
        let b = series("b", vec![0.3, 0.1, 0.2]);
        let matrix = correlation_matrix(&[a, b]);
        let df = matrix.to_frame().unwrap();

        assert_eq!(df.shape(), (2, 3));
        assert!(df.column("a").is_ok());
        assert!(df.column("b").is_ok());
    }
}
