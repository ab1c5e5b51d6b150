//! Side-by-side statistics tables.

use crate::format::{format_metric, format_percent};
use factorscope_portfolio::PortfolioWeights;
use factorscope_stats::{Metric, SummaryStatistics};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary statistics of several series, one column per series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsTable {
    /// Optional heading.
    pub title: Option<String>,
    /// `(column name, statistics)` in display order.
    pub columns: Vec<(String, SummaryStatistics)>,
}

impl StatisticsTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a column.
    pub fn push(&mut self, name: impl Into<String>, stats: SummaryStatistics) {
        self.columns.push((name.into(), stats));
    }

    /// Append a column, builder style.
    pub fn with_column(mut self, name: impl Into<String>, stats: SummaryStatistics) -> Self {
        self.push(name, stats);
        self
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Formatted cells, one row per metric in display order.
    pub fn rows(&self) -> Vec<(Metric, Vec<String>)> {
        Metric::ALL
            .iter()
            .map(|&metric| {
                let cells = self
                    .columns
                    .iter()
                    .map(|(_, stats)| format_metric(metric, stats.get(metric)))
                    .collect();
                (metric, cells)
            })
            .collect()
    }

    fn widths(&self, rows: &[(Metric, Vec<String>)]) -> (usize, Vec<usize>) {
        let label = Metric::ALL
            .iter()
            .map(|m| m.label().len())
            .max()
            .unwrap_or_default()
            .max("Metric".len());
        let cells = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| {
                rows.iter()
                    .map(|(_, cells)| cells[i].len())
                    .max()
                    .unwrap_or_default()
                    .max(name.len())
            })
            .collect();
        (label, cells)
    }

    /// Render as a fixed-width ASCII table.
    pub fn to_ascii_table(&self) -> String {
        let rows = self.rows();
        let (label_width, widths) = self.widths(&rows);
        let total = label_width + widths.iter().map(|w| w + 2).sum::<usize>();
        let mut output = String::new();

        if let Some(title) = &self.title {
            output.push_str(&format!("\n{title}\n"));
        }
        output.push_str(&"=".repeat(total));
        output.push('\n');

        output.push_str(&format!("{:<label_width$}", "Metric"));
        for ((name, _), width) in self.columns.iter().zip(&widths) {
            output.push_str(&format!("  {name:>width$}"));
        }
        output.push('\n');
        output.push_str(&"-".repeat(total));
        output.push('\n');

        for (metric, cells) in &rows {
            output.push_str(&format!("{:<label_width$}", metric.label()));
            for (cell, width) in cells.iter().zip(&widths) {
                output.push_str(&format!("  {cell:>width$}"));
            }
            output.push('\n');
        }

        output.push_str(&"=".repeat(total));
        output.push('\n');
        output
    }

    /// Render as a GitHub-flavored Markdown table.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        if let Some(title) = &self.title {
            output.push_str(&format!("### {title}\n\n"));
        }

        output.push_str("| Metric |");
        for name in self.column_names() {
            output.push_str(&format!(" {name} |"));
        }
        output.push_str("\n|---|");
        output.push_str(&"---:|".repeat(self.len()));
        output.push('\n');

        for (metric, cells) in self.rows() {
            output.push_str(&format!("| {} |", metric.label()));
            for cell in cells {
                output.push_str(&format!(" {cell} |"));
            }
            output.push('\n');
        }
        output
    }
}

impl fmt::Display for StatisticsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

/// Two-column table of normalized portfolio weights as percentages.
///
/// `label` maps a series identifier to its display name.
pub fn weights_table<F>(weights: &PortfolioWeights, label: F) -> String
where
    F: Fn(&str) -> String,
{
    let rows: Vec<(String, String)> = weights
        .iter()
        .map(|(id, w)| (label(id), format_percent(w)))
        .collect();
    let width = rows
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or_default()
        .max("Factor".len());

    let mut output = format!("{:<width$}  {:>8}\n", "Factor", "Weight");
    output.push_str(&"-".repeat(width + 10));
    output.push('\n');
    for (name, weight) in rows {
        output.push_str(&format!("{name:<width$}  {weight:>8}\n"));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> SummaryStatistics {
        SummaryStatistics {
            observations: 4,
            mean_return: Some(0.15),
            volatility: Some(0.059_160_797_830_996_155),
            sharpe_ratio: Some(2.535_462_764_185_550_3),
            beta: Some(1.885_714_285_714_285_7),
            average_n_stocks: Some(101.5),
            ..Default::default()
        }
    }

    #[test]
    fn test_rows_follow_metric_order() {
        let table = StatisticsTable::new().with_column("A", stats());
        let rows = table.rows();
        assert_eq!(rows.len(), Metric::ALL.len());
        assert_eq!(rows[0].0, Metric::Beta);
        assert_eq!(rows[0].1, vec!["1.89".to_string()]);
        assert_eq!(rows[1].1, vec!["N/A".to_string()]);
    }

    #[test]
    fn test_ascii_table() {
        let table = StatisticsTable::new()
            .with_title("Market Relative Statistics")
            .with_column("Book-to-Market", stats())
            .with_column("Market Portfolio", SummaryStatistics::default());
        let ascii = table.to_ascii_table();

        assert!(ascii.contains("Market Relative Statistics"));
        assert!(ascii.contains("Book-to-Market"));
        assert!(ascii.contains("Mean Return (% p.a.)"));
        assert!(ascii.contains("15.00%"));
        assert!(ascii.contains("5.92%"));
        assert!(ascii.contains("101"));
        assert!(ascii.contains("N/A"));
        assert_eq!(ascii, table.to_string());
    }

    #[test]
    fn test_markdown_table() {
        let table = StatisticsTable::new()
            .with_column("A", stats())
            .with_column("B", stats());
        let md = table.to_markdown();
        let lines: Vec<&str> = md.lines().collect();

        assert_eq!(lines[0], "| Metric | A | B |");
        assert_eq!(lines[1], "|---|---:|---:|");
        assert_eq!(lines[2], "| Beta | 1.89 | 1.89 |");
        assert_eq!(lines.len(), 2 + Metric::ALL.len());
    }

    #[test]
    fn test_weights_table() {
        let weights = PortfolioWeights::new([("value/bm", 3.0), ("momentum/mom", 1.0)]).unwrap();
        let rendered = weights_table(&weights, |id| id.to_uppercase());
        assert!(rendered.contains("VALUE/BM"));
        assert!(rendered.contains("75.00%"));
        assert!(rendered.contains("25.00%"));
    }
}
