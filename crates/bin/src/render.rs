//! Text and Markdown rendering of analysis reports.

use factorscope::AnalysisReport;
use factorscope::catalog::{display_name, return_type_name};
use factorscope_output::{StatisticsTable, format_percent, format_value, weights_table};
use factorscope_stats::{CorrelationMatrix, MetricKind, QuantileBucket};
use std::fmt::Write;

/// Output flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Style {
    Text,
    Markdown,
}

fn heading(out: &mut String, style: Style, title: &str) {
    match style {
        Style::Text => {
            let _ = writeln!(out, "\n{title}");
            let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
        }
        Style::Markdown => {
            let _ = writeln!(out, "\n## {title}\n");
        }
    }
}

fn table(out: &mut String, style: Style, table: &StatisticsTable) {
    match style {
        Style::Text => out.push_str(&table.to_ascii_table()),
        Style::Markdown => out.push_str(&table.to_markdown()),
    }
}

/// Render the full report.
pub(crate) fn report(report: &AnalysisReport, style: Style) -> String {
    let mut out = String::new();
    let title = "FACTOR PERFORMANCE ANALYSIS";

    match style {
        Style::Text => {
            let _ = writeln!(out, "\n╔{}╗", "═".repeat(62));
            let _ = writeln!(out, "║{title:^62}║");
            let _ = writeln!(out, "╚{}╝", "═".repeat(62));
        }
        Style::Markdown => {
            let _ = writeln!(out, "# {}", title);
        }
    }

    let period = match (report.start, report.end) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        _ => "n/a".to_string(),
    };
    let _ = writeln!(out, "\nPeriod: {period}");
    let _ = writeln!(out, "Returns: {}", return_type_name(&report.return_column));

    if !report.warnings.is_empty() {
        heading(&mut out, style, "Warnings");
        for warning in &report.warnings {
            let _ = writeln!(out, "- {warning}");
        }
    }

    heading(&mut out, style, "Portfolio Weights");
    let weights = weights_table(&report.weights, display_name);
    match style {
        Style::Text => out.push_str(&weights),
        Style::Markdown => {
            let _ = writeln!(out, "```text\n{weights}```");
        }
    }

    heading(&mut out, style, "Total Return");
    for series in &report.series {
        let total = series.cumulative.total_return().map_or_else(
            || "N/A".to_string(),
            format_percent,
        );
        let excess = series
            .excess_cumulative
            .as_ref()
            .and_then(|c| c.total_return())
            .map_or_else(|| "N/A".to_string(), format_percent);
        let _ = writeln!(out, "- {}: {total} (excess {excess})", series.name);
    }

    table(&mut out, style, &report.statistics_table());

    let focus = &report.focus;
    heading(&mut out, style, &format!("Detailed Analysis: {}", focus.name));
    let last_sharpe = focus.rolling.rolling_sharpe.iter().rev().flatten().next().copied();
    let _ = writeln!(
        out,
        "Rolling Sharpe ({}m, latest): {}",
        focus.rolling.window,
        format_value(MetricKind::Ratio, last_sharpe)
    );
    let max_dd = format_value(MetricKind::Percentage, focus.drawdown.max_drawdown());
    match focus.drawdown.max_drawdown_date() {
        Some(date) => {
            let _ = writeln!(out, "Max drawdown: {max_dd} ({date})");
        }
        None => {
            let _ = writeln!(out, "Max drawdown: {max_dd}");
        }
    }
    let _ = writeln!(
        out,
        "Current drawdown: {}",
        format_value(MetricKind::Percentage, focus.drawdown.current())
    );
    if focus.relative.has_market() {
        let last = |values: &[Option<f64>]| values.iter().rev().flatten().next().copied();
        let _ = writeln!(
            out,
            "Rolling beta (latest): {}",
            format_value(MetricKind::Ratio, last(&focus.relative.rolling_beta[..]))
        );
        let _ = writeln!(
            out,
            "Rolling tracking error (latest): {}",
            format_value(MetricKind::Percentage, last(&focus.relative.tracking_error[..]))
        );
    }
    table(&mut out, style, &focus.statistics_table());

    if let Some(buckets) = &focus.quantiles {
        heading(&mut out, style, "Quantile Analysis");
        out.push_str(&quantiles(buckets));
    }

    if let Some(correlations) = &report.correlations {
        heading(&mut out, style, "Excess Return Correlations");
        out.push_str(&correlation_matrix(correlations));
    }

    out
}

fn quantiles(buckets: &[QuantileBucket]) -> String {
    let mut out = format!(
        "{:>3}  {:>9}  {:>9}  {:>5}  {:>9}  {:>9}\n",
        "Q", "Lower", "Upper", "N", "Mean", "Std"
    );
    for b in buckets {
        let _ = writeln!(
            out,
            "{:>3}  {:>9}  {:>9}  {:>5}  {:>9}  {:>9}",
            b.quantile,
            format_percent(b.lower),
            format_percent(b.upper),
            b.count,
            format_value(MetricKind::Percentage, b.mean),
            format_value(MetricKind::Percentage, b.std_dev),
        );
    }
    out
}

fn correlation_matrix(matrix: &CorrelationMatrix) -> String {
    let mut out = String::new();
    for (i, label) in matrix.labels.iter().enumerate() {
        let _ = writeln!(out, "[{}] {label}", i + 1);
    }
    let _ = write!(out, "\n{:>5}", "");
    for i in 0..matrix.len() {
        let _ = write!(out, "{:>8}", format!("[{}]", i + 1));
    }
    out.push('\n');
    for i in 0..matrix.len() {
        let _ = write!(out, "{:>5}", format!("[{}]", i + 1));
        for j in 0..matrix.len() {
            let cell = format_value(MetricKind::Correlation, matrix.values[[i, j]]);
            let _ = write!(out, "{cell:>8}");
        }
        out.push('\n');
    }
    out
}
