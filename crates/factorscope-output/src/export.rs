//! CSV and JSON export of analysis results.
//!
//! Undefined values are written as empty CSV fields and JSON `null`.

use crate::columns::{Columnar, DatedColumns};
use crate::table::StatisticsTable;
use factorscope_portfolio::BlendedSeries;
use factorscope_stats::{
    CorrelationMatrix, CumulativeSeries, DrawdownSeries, Metric, QuantileBucket, RelativeStats,
    ReturnSeries, ReturnTable, RollingStats,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        tracing::debug!(path = %path.display(), ?format, "exported");
        Ok(())
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, ExportError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn columns_to_csv(view: &DatedColumns<'_>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["date".to_string()];
    header.extend(view.names().map(str::to_string));
    wtr.write_record(&header)?;

    for (i, date) in view.dates.iter().enumerate() {
        let mut record = vec![date.to_string()];
        record.extend(view.columns.iter().map(|(_, values)| cell(values[i])));
        wtr.write_record(&record)?;
    }
    into_string(wtr)
}

macro_rules! columnar_exporter {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Exporter for $ty {
                fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
                    match format {
                        ExportFormat::Csv => columns_to_csv(&self.dated_columns()),
                        ExportFormat::Json => json(self, false),
                        ExportFormat::PrettyJson => json(self, true),
                    }
                }
            }
        )+
    };
}

columnar_exporter!(
    RollingStats,
    DrawdownSeries,
    RelativeStats,
    CumulativeSeries,
    ReturnSeries,
    ReturnTable,
    BlendedSeries,
);

/// JSON shape of a statistics table: raw values keyed by metric.
#[derive(Debug, Serialize)]
struct StatisticsRecord<'a> {
    series: &'a str,
    observations: usize,
    metrics: Vec<(Metric, Option<f64>)>,
}

impl Exporter for StatisticsTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = vec!["metric".to_string()];
                header.extend(self.column_names().map(str::to_string));
                wtr.write_record(&header)?;
                for metric in Metric::ALL {
                    let mut record = vec![metric.label().to_string()];
                    record.extend(self.columns.iter().map(|(_, s)| cell(s.get(metric))));
                    wtr.write_record(&record)?;
                }
                into_string(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => {
                let records: Vec<StatisticsRecord<'_>> = self
                    .columns
                    .iter()
                    .map(|(name, stats)| StatisticsRecord {
                        series: name,
                        observations: stats.observations,
                        metrics: stats.iter().collect(),
                    })
                    .collect();
                json(&records, format == ExportFormat::PrettyJson)
            }
        }
    }
}

impl Exporter for CorrelationMatrix {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = vec![String::new()];
                header.extend(self.labels.iter().cloned());
                wtr.write_record(&header)?;
                for (label, row) in self.labels.iter().zip(self.values.rows()) {
                    let mut record = vec![label.clone()];
                    record.extend(row.iter().map(|v| cell(*v)));
                    wtr.write_record(&record)?;
                }
                into_string(wtr)
            }
            ExportFormat::Json => json(self, false),
            ExportFormat::PrettyJson => json(self, true),
        }
    }
}

impl Exporter for Vec<QuantileBucket> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for bucket in self {
                    wtr.serialize(bucket)?;
                }
                into_string(wtr)
            }
            ExportFormat::Json => json(self, false),
            ExportFormat::PrettyJson => json(self, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use factorscope_stats::{ReturnSeries, SummaryStatistics, drawdown, rolling_stats};
    use std::io::Read;

    fn series() -> ReturnSeries {
        let dates = (1..=4)
            .map(|m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap())
            .collect();
        ReturnSeries::new("bm", dates, vec![0.1, -0.2, 0.05, 0.3]).unwrap()
    }

    #[test]
    fn test_rolling_csv_leaves_undefined_cells_empty() {
        let stats = rolling_stats(&series(), 3).unwrap();
        let csv = stats.export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "date,rolling_mean,rolling_std,rolling_sharpe");
        assert_eq!(lines[1], "2024-01-01,,,");
        assert!(lines[3].starts_with("2024-03-01,"));
        assert!(!lines[3].ends_with(','));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_drawdown_json() {
        let dd = drawdown(&series());
        let json = dd.export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"running_peak\""));
        assert!(json.contains("\"2024-02-01\""));

        let pretty = dd.export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(pretty.contains("  "));
    }

    #[test]
    fn test_statistics_table_csv() {
        let stats = SummaryStatistics {
            beta: Some(1.5),
            ..Default::default()
        };
        let table = StatisticsTable::new().with_column("bm", stats);
        let csv = table.export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "metric,bm");
        assert_eq!(lines[1], "Beta,1.5");
        assert_eq!(lines[2], "Correlation,");

        let json = table.export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"beta\""));
        assert!(json.contains("null"));
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("pretty-json".parse::<ExportFormat>().unwrap(), ExportFormat::PrettyJson);
        assert!(matches!(
            "xml".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join("factorscope_export_series.csv");
        series().export_to_file(&path, ExportFormat::Csv).unwrap();

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.starts_with("date,bm"));
        assert!(content.contains("2024-04-01,0.3"));

        std::fs::remove_file(path).ok();
    }
}
