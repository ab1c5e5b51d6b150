//! Request pipeline: load, clip, blend and compute statistics.
//!
//! One [`AnalysisRequest`] produces one [`AnalysisReport`]. Conditions that
//! leave part of the report undefined, such as a missing market portfolio or
//! factors without common dates, are collected as [`AnalysisWarning`]s.

use crate::catalog;
use crate::error::{AnalysisError, Result};
use crate::key::FactorSelection;
use chrono::NaiveDate;
use derive_more::Display;
use factorscope_data::{FactorStore, SeriesQuery};
use factorscope_output::StatisticsTable;
use factorscope_portfolio::{BlendedSeries, MULTIFACTOR_NAME, PortfolioError, PortfolioWeights, blend};
use factorscope_stats::{
    CorrelationMatrix, CumulativeSeries, DrawdownSeries, QuantileBucket, RelativeStats,
    ReturnSeries, ReturnTable, RollingConfig, RollingStats, StatsError, SummaryStatistics,
    cumulative_value, drawdown, excess_cumulative_returns, excess_return_correlation,
    market_relative_statistics, quantile_analysis, relative_performance, rolling_stats_with,
    summary_statistics,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default return column.
pub const DEFAULT_RETURN_COLUMN: &str = "ret_vw";

/// Display name of the market portfolio.
pub const MARKET_NAME: &str = "Market Portfolio";

/// Parameters of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Selected factors with their rank filters.
    pub factors: Vec<FactorSelection>,
    /// Market-cap bucket (`rank_ME`) shared by every factor.
    pub market_cap: Option<i64>,
    /// Market portfolio bucket; defaults to `market_cap`.
    pub market_rank: Option<i64>,
    /// Return column to analyse.
    pub return_column: String,
    /// Rolling window in months.
    pub window: usize,
    /// First date to include.
    pub start: Option<NaiveDate>,
    /// Last date to include.
    pub end: Option<NaiveDate>,
    /// Raw blend weights by `group/factor`; equal weights when absent.
    pub weights: Option<BTreeMap<String, f64>>,
    /// Series for the detailed analysis, by id or display name. Defaults to
    /// the multifactor portfolio.
    pub focus: Option<String>,
    /// Number of quantile buckets for the focus series.
    pub quantiles: Option<usize>,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            factors: Vec::new(),
            market_cap: None,
            market_rank: None,
            return_column: DEFAULT_RETURN_COLUMN.to_string(),
            window: 12,
            start: None,
            end: None,
            weights: None,
            focus: None,
            quantiles: None,
        }
    }
}

impl AnalysisRequest {
    /// Request for the given factors with default settings.
    pub fn new(factors: Vec<FactorSelection>) -> Self {
        Self {
            factors,
            ..Default::default()
        }
    }

    /// Set the shared market-cap bucket.
    pub const fn with_market_cap(mut self, rank: i64) -> Self {
        self.market_cap = Some(rank);
        self
    }

    /// Set the market portfolio bucket.
    pub const fn with_market_rank(mut self, rank: i64) -> Self {
        self.market_rank = Some(rank);
        self
    }

    /// Set the rolling window.
    pub const fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Restrict the analysis to an inclusive date range.
    pub const fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set raw blend weights.
    pub fn with_weights(mut self, weights: BTreeMap<String, f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Set the focus series.
    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = Some(focus.into());
        self
    }
}

/// Recoverable conditions met while building a report.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// A factor selection matched no rows and was left out.
    #[display("{series}: selection matched no rows")]
    EmptySelection {
        /// Series id.
        series: String,
    },
    /// No market-cap bucket was given for the market portfolio.
    #[display("no market-cap rank given, market statistics not available")]
    NoMarketRank,
    /// The market portfolio is absent or empty for the bucket.
    #[display("market portfolio not available for rank {rank}")]
    MissingMarket {
        /// Requested bucket.
        rank: i64,
    },
    /// The selected factors do not overlap in time.
    #[display("selected series share no common date range")]
    NoCommonRange,
    /// The multifactor portfolio could not be built.
    #[display("could not create multifactor portfolio: no common dates across factors")]
    NoCommonDates,
    /// The focus series shares no dates with the market.
    #[display("{series}: no dates in common with the market portfolio")]
    NoMarketOverlap {
        /// Series name.
        series: String,
    },
    /// Quantile buckets could not be formed.
    #[display("quantile analysis not available: {reason}")]
    QuantilesUnavailable {
        /// Underlying error message.
        reason: String,
    },
}

/// Per-series part of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    /// `group/factor` id, or the multifactor name.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Clipped return series.
    pub series: ReturnSeries,
    /// Cumulative value.
    pub cumulative: CumulativeSeries,
    /// Cumulative value of returns in excess of the market.
    pub excess_cumulative: Option<CumulativeSeries>,
    /// Summary statistics, market-relative when a market is present.
    pub statistics: SummaryStatistics,
}

/// Detailed analysis of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusReport {
    /// Display name.
    pub name: String,
    /// Rolling mean, volatility and Sharpe ratio.
    pub rolling: RollingStats,
    /// Drawdown path.
    pub drawdown: DrawdownSeries,
    /// Rolling market-relative statistics.
    pub relative: RelativeStats,
    /// Statistics against the market, or standalone without one.
    pub market_relative: SummaryStatistics,
    /// The market portfolio's own statistics.
    pub market_summary: Option<SummaryStatistics>,
    /// Return distribution by quantile.
    pub quantiles: Option<Vec<QuantileBucket>>,
}

impl FocusReport {
    /// Focus series next to the market portfolio.
    pub fn statistics_table(&self) -> StatisticsTable {
        let table = StatisticsTable::new()
            .with_title("Market Relative Statistics")
            .with_column(self.name.clone(), self.market_relative.clone());
        match &self.market_summary {
            Some(market) => table.with_column(MARKET_NAME, market.clone()),
            None => table,
        }
    }
}

/// Everything computed for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Analysed return column.
    pub return_column: String,
    /// First date after clipping.
    pub start: Option<NaiveDate>,
    /// Last date after clipping.
    pub end: Option<NaiveDate>,
    /// Factors in id order, then the multifactor portfolio.
    pub series: Vec<SeriesReport>,
    /// Normalized blend weights.
    pub weights: PortfolioWeights,
    /// Multifactor blend of the requested return column.
    pub blended: Option<BlendedSeries>,
    /// Clipped market portfolio.
    pub market: Option<ReturnSeries>,
    /// Market portfolio statistics.
    pub market_statistics: Option<SummaryStatistics>,
    /// Detailed analysis of the focus series.
    pub focus: FocusReport,
    /// Correlations of returns in excess of the market.
    pub correlations: Option<CorrelationMatrix>,
    /// Recoverable conditions, in the order they occurred.
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisReport {
    /// Series report by id or display name.
    pub fn get(&self, id_or_name: &str) -> Option<&SeriesReport> {
        self.series
            .iter()
            .find(|r| r.id == id_or_name || r.name == id_or_name)
    }

    /// Whether market statistics are available.
    pub const fn has_market(&self) -> bool {
        self.market.is_some()
    }

    /// Summary statistics of every series, with the market last.
    pub fn statistics_table(&self) -> StatisticsTable {
        let mut table = StatisticsTable::new().with_title("Summary Statistics");
        for report in &self.series {
            table.push(report.name.clone(), report.statistics.clone());
        }
        if let Some(market) = &self.market_statistics {
            table.push(MARKET_NAME, market.clone());
        }
        table
    }
}

/// Run the full pipeline for one request.
///
/// # Errors
/// Returns an error for an empty or malformed selection, a window below two,
/// invalid weights, an unknown return column or focus series, or a store
/// failure. Missing market data and non-overlapping dates are warnings.
pub fn analyze(store: &FactorStore, request: &AnalysisRequest) -> Result<AnalysisReport> {
    if request.factors.is_empty() {
        return Err(AnalysisError::NoFactors);
    }
    let rolling_config = RollingConfig::with_window(request.window);
    rolling_config.validate()?;

    let mut warnings = Vec::new();
    let tables = load_factors(store, request, &mut warnings)?;
    let market = load_market(store, request, &mut warnings)?;

    // Common range of the factors, narrowed by the requested range.
    let common_start = tables.values().filter_map(ReturnTable::first_date).max();
    let common_end = tables.values().filter_map(ReturnTable::last_date).min();
    let start = common_start.max(request.start);
    let end = match (common_end, request.end) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    if let (Some(s), Some(e)) = (start, end)
        && s > e
    {
        tracing::warn!(start = %s, end = %e, "selected series share no common date range");
        warnings.push(AnalysisWarning::NoCommonRange);
    }

    let tables: BTreeMap<String, ReturnTable> = tables
        .into_iter()
        .map(|(id, table)| (id, table.between(start, end)))
        .collect();
    let market = market.map(|m| m.between(start, end));

    let weights = match &request.weights {
        Some(raw) => PortfolioWeights::new(
            raw.iter()
                .filter(|(id, _)| tables.contains_key(*id))
                .map(|(id, w)| (id.clone(), *w)),
        )?,
        None => PortfolioWeights::equal(tables.keys().cloned())?,
    };
    let blended = match blend(&tables, Some(&weights)) {
        Ok(blended) => Some(blended),
        Err(PortfolioError::NoCommonDates) => {
            warnings.push(AnalysisWarning::NoCommonDates);
            None
        }
        Err(e) => return Err(e.into()),
    };

    let mut series = Vec::with_capacity(tables.len() + 1);
    for (id, table) in &tables {
        let returns = table.series(catalog::display_name(id), &request.return_column)?;
        series.push(series_report(id.clone(), returns, market.as_ref()));
    }
    if let Some(blended) = &blended {
        let returns = blended.series(MULTIFACTOR_NAME, &request.return_column)?;
        series.push(series_report(MULTIFACTOR_NAME.to_string(), returns, market.as_ref()));
    }

    let focus_index = match &request.focus {
        Some(focus) => series
            .iter()
            .position(|r| r.id == *focus || r.name == *focus)
            .ok_or_else(|| AnalysisError::UnknownFocus(focus.clone()))?,
        None if blended.is_some() => series.len() - 1,
        None => 0,
    };
    let focus = focus_report(
        &series[focus_index].series,
        market.as_ref(),
        &rolling_config,
        request.quantiles,
        &mut warnings,
    )?;

    let correlations = market.as_ref().map(|m| {
        let all: Vec<ReturnSeries> = series.iter().map(|r| r.series.clone()).collect();
        excess_return_correlation(&all, m)
    });
    let market_statistics = market.as_ref().map(summary_statistics);

    tracing::info!(
        series = series.len(),
        start = ?start,
        end = ?end,
        market = market.is_some(),
        warnings = warnings.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        return_column: request.return_column.clone(),
        start,
        end,
        series,
        weights,
        blended,
        market,
        market_statistics,
        focus,
        correlations,
        warnings,
    })
}

/// Load every selected factor, keyed by `group/factor`.
fn load_factors(
    store: &FactorStore,
    request: &AnalysisRequest,
    warnings: &mut Vec<AnalysisWarning>,
) -> Result<BTreeMap<String, ReturnTable>> {
    let ids: BTreeSet<String> = request.factors.iter().map(|f| f.key.to_string()).collect();
    if ids.len() != request.factors.len() {
        return Err(AnalysisError::InvalidSelection(
            "a factor is selected more than once".to_string(),
        ));
    }

    let mut tables = BTreeMap::new();
    for selection in &request.factors {
        let id = selection.key.to_string();
        let mut query = SeriesQuery::new(&selection.key.group, &selection.key.factor)
            .with_column(request.return_column.clone());
        if let Some(rank) = request.market_cap {
            query = query.with_market_cap(rank);
        }
        for (column, value) in &selection.rank_filters {
            query = query.with_rank(column.clone(), *value);
        }

        let table = store.load_series(&query)?;
        if table.is_empty() {
            warnings.push(AnalysisWarning::EmptySelection { series: id });
            continue;
        }
        tracing::debug!(series = %id, rows = table.len(), "loaded factor");
        tables.insert(id, table);
    }

    if tables.is_empty() {
        return Err(AnalysisError::NoData);
    }
    Ok(tables)
}

/// Market portfolio series for the requested bucket.
fn load_market(
    store: &FactorStore,
    request: &AnalysisRequest,
    warnings: &mut Vec<AnalysisWarning>,
) -> Result<Option<ReturnSeries>> {
    let Some(rank) = request.market_rank.or(request.market_cap) else {
        warnings.push(AnalysisWarning::NoMarketRank);
        return Ok(None);
    };
    match store.market_column(rank, &request.return_column)? {
        Some(table) if !table.is_empty() => {
            Ok(Some(table.series(MARKET_NAME, &request.return_column)?))
        }
        _ => {
            tracing::warn!(rank, "market portfolio not available");
            warnings.push(AnalysisWarning::MissingMarket { rank });
            Ok(None)
        }
    }
}

fn series_report(id: String, series: ReturnSeries, market: Option<&ReturnSeries>) -> SeriesReport {
    let statistics = market.map_or_else(
        || summary_statistics(&series),
        |m| market_relative_statistics(&series, m),
    );
    SeriesReport {
        id,
        name: series.name().to_string(),
        cumulative: cumulative_value(&series),
        excess_cumulative: market.map(|m| excess_cumulative_returns(&series, m)),
        statistics,
        series,
    }
}

fn focus_report(
    series: &ReturnSeries,
    market: Option<&ReturnSeries>,
    rolling_config: &RollingConfig,
    quantiles: Option<usize>,
    warnings: &mut Vec<AnalysisWarning>,
) -> Result<FocusReport> {
    let window = rolling_config.window;
    let relative = match relative_performance(series, market, window) {
        Ok(relative) => relative,
        Err(StatsError::EmptyIntersection) => {
            warnings.push(AnalysisWarning::NoMarketOverlap {
                series: series.name().to_string(),
            });
            relative_performance(series, None, window)?
        }
        Err(e) => return Err(e.into()),
    };

    let quantiles = match quantiles.map(|n| quantile_analysis(series, n)) {
        Some(Ok(buckets)) => Some(buckets),
        Some(Err(e)) => {
            warnings.push(AnalysisWarning::QuantilesUnavailable {
                reason: e.to_string(),
            });
            None
        }
        None => None,
    };

    Ok(FocusReport {
        name: series.name().to_string(),
        rolling: rolling_stats_with(series, rolling_config)?,
        drawdown: drawdown(series),
        relative,
        market_relative: market.map_or_else(
            || summary_statistics(series),
            |m| market_relative_statistics(series, m),
        ),
        market_summary: market.map(summary_statistics),
        quantiles,
    })
}
