//! Directory-backed factor return store.

use crate::cache::{CacheStats, LoadCache};
use crate::error::{DataError, Result};
use crate::frame::{FactorFrame, MARKET_CAP_RANK};
use factorscope_stats::ReturnTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for the factor store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root data directory (default: `data`)
    pub base_path: PathBuf,
    /// Market portfolio file directly under the root
    pub market_file: String,
    /// Whether the files store returns in percent (default: true)
    pub returns_in_percent: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("data"),
            market_file: "portf_me_monthly_2023.csv".to_string(),
            returns_in_percent: true,
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `base_path`.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Default::default()
        }
    }
}

/// Selection of one factor portfolio series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesQuery {
    /// Group directory name.
    pub group: String,
    /// Factor id within the group.
    pub factor: String,
    /// Market-capitalization bucket (`rank_ME`).
    pub market_cap_rank: Option<i64>,
    /// Additional `rank_*` column filters.
    pub rank_filters: BTreeMap<String, i64>,
    /// Return column to project onto; all gap-free columns when `None`.
    pub column: Option<String>,
}

impl SeriesQuery {
    /// Unfiltered query for `group/factor`.
    pub fn new(group: impl Into<String>, factor: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            factor: factor.into(),
            market_cap_rank: None,
            rank_filters: BTreeMap::new(),
            column: None,
        }
    }

    /// Restrict to one market-cap bucket.
    pub const fn with_market_cap(mut self, rank: i64) -> Self {
        self.market_cap_rank = Some(rank);
        self
    }

    /// Restrict a factor rank column to one value.
    pub fn with_rank(mut self, column: impl Into<String>, value: i64) -> Self {
        self.rank_filters.insert(column.into(), value);
        self
    }

    /// Project onto one return column, keeping every month where it is set.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// `group/factor` label.
    pub fn label(&self) -> String {
        format!("{}/{}", self.group, self.factor)
    }

    fn filters(&self) -> BTreeMap<String, i64> {
        let mut filters = self.rank_filters.clone();
        if let Some(rank) = self.market_cap_rank {
            filters.insert(MARKET_CAP_RANK.to_string(), rank);
        }
        filters
    }
}

/// Progress of a directory scan.
#[derive(Debug, Clone, Copy)]
pub struct LoadProgress<'a> {
    /// Zero-based index of the file being loaded.
    pub index: usize,
    /// Number of files found.
    pub total: usize,
    /// File being loaded.
    pub path: &'a Path,
}

#[derive(Debug)]
struct FactorFile {
    group: String,
    factor: String,
    path: PathBuf,
}

/// Factor id encoded in a file name: the part after the last `portf_` and
/// before the first `_monthly`.
pub fn factor_id(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let tail = stem.rsplit("portf_").next()?;
    tail.split("_monthly").next().map(str::to_string)
}

fn is_csv(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Collect every CSV file below `dir`, sorted by path.
fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            walk(&path, out)?;
        } else if is_csv(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn discover(config: &StoreConfig) -> Result<Vec<FactorFile>> {
    let base = &config.base_path;
    let mut paths = Vec::new();
    walk(base, &mut paths)?;

    let mut files = Vec::new();
    for path in paths {
        let relative = path.strip_prefix(base).unwrap_or(&path);
        let mut components = relative.components();
        let group = components.next().and_then(|c| c.as_os_str().to_str());
        // Files directly under the root have a single component
        let (Some(group), Some(_)) = (group, components.next()) else {
            tracing::debug!(path = %path.display(), "skipping file outside a group directory");
            continue;
        };
        let Some(factor) = factor_id(&path) else {
            tracing::warn!(path = %path.display(), "cannot derive factor id");
            continue;
        };
        files.push(FactorFile {
            group: group.to_string(),
            factor,
            path,
        });
    }
    Ok(files)
}

/// Monthly factor portfolios grouped by directory, plus the market portfolio.
#[derive(Debug)]
pub struct FactorStore {
    config: StoreConfig,
    market: Option<Arc<FactorFrame>>,
    groups: BTreeMap<String, BTreeMap<String, Arc<FactorFrame>>>,
    cache: LoadCache,
}

impl FactorStore {
    /// Scan and load the data directory.
    ///
    /// # Errors
    /// Returns [`DataError::DirectoryNotFound`] if the root does not exist,
    /// or an IO error if it cannot be listed. Files that fail to parse are
    /// skipped with a warning.
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::open_with_progress(config, |_| {})
    }

    /// Like [`FactorStore::open`], reporting each file as it is loaded.
    ///
    /// # Errors
    /// See [`FactorStore::open`].
    pub fn open_with_progress<F>(config: StoreConfig, progress: F) -> Result<Self>
    where
        F: FnMut(LoadProgress<'_>),
    {
        let mut store = Self {
            config,
            market: None,
            groups: BTreeMap::new(),
            cache: LoadCache::new(),
        };
        store.scan(progress)?;
        Ok(store)
    }

    /// Re-scan the directory; unchanged files are served from the cache.
    ///
    /// # Errors
    /// See [`FactorStore::open`].
    pub fn refresh(&mut self) -> Result<()> {
        self.scan(|_| {})
    }

    fn scan<F>(&mut self, mut progress: F) -> Result<()>
    where
        F: FnMut(LoadProgress<'_>),
    {
        let base = self.config.base_path.clone();
        if !base.is_dir() {
            return Err(DataError::DirectoryNotFound(base));
        }

        let market_path = base.join(&self.config.market_file);
        let files = discover(&self.config)?;
        let total = files.len() + usize::from(market_path.is_file());
        let in_percent = self.config.returns_in_percent;
        let load = |p: &Path| FactorFrame::from_path(p, in_percent);

        let mut index = 0;
        self.market = None;
        if market_path.is_file() {
            progress(LoadProgress {
                index,
                total,
                path: &market_path,
            });
            index += 1;
            match self.cache.get_or_load(&market_path, load) {
                Ok(frame) => self.market = Some(frame),
                Err(e) => tracing::warn!(path = %market_path.display(), error = %e, "skipping market file"),
            }
        } else {
            tracing::warn!(path = %market_path.display(), "market portfolio file not found");
        }

        let mut groups: BTreeMap<String, BTreeMap<String, Arc<FactorFrame>>> = BTreeMap::new();
        for file in &files {
            progress(LoadProgress {
                index,
                total,
                path: &file.path,
            });
            index += 1;

            let frame = match self.cache.get_or_load(&file.path, load) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(path = %file.path.display(), error = %e, "skipping file");
                    continue;
                }
            };
            let factors = groups.entry(file.group.clone()).or_default();
            if factors.insert(file.factor.clone(), frame).is_some() {
                tracing::warn!(
                    group = %file.group,
                    factor = %file.factor,
                    path = %file.path.display(),
                    "duplicate factor id, keeping the later file"
                );
            }
        }

        let mut live: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
        live.push(market_path);
        self.cache.retain_paths(&live);
        self.groups = groups;

        tracing::info!(
            groups = self.groups.len(),
            factors = self.groups.values().map(BTreeMap::len).sum::<usize>(),
            market = self.market.is_some(),
            "factor store loaded"
        );
        Ok(())
    }

    /// Store configuration.
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Cache counters accumulated over all scans.
    pub const fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Group names, sorted.
    pub fn groups(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    /// Factor ids of a group, sorted.
    ///
    /// # Errors
    /// Returns [`DataError::UnknownGroup`] if the group does not exist.
    pub fn factors(&self, group: &str) -> Result<Vec<&str>> {
        self.groups
            .get(group)
            .map(|f| f.keys().map(String::as_str).collect())
            .ok_or_else(|| DataError::UnknownGroup(group.to_string()))
    }

    /// Parsed file of one factor.
    ///
    /// # Errors
    /// Returns an error if the group or factor does not exist.
    pub fn frame(&self, group: &str, factor: &str) -> Result<&FactorFrame> {
        let factors = self
            .groups
            .get(group)
            .ok_or_else(|| DataError::UnknownGroup(group.to_string()))?;
        factors
            .get(factor)
            .map(Arc::as_ref)
            .ok_or_else(|| DataError::UnknownFactor {
                group: group.to_string(),
                factor: factor.to_string(),
            })
    }

    /// Market-cap buckets available for a factor.
    ///
    /// # Errors
    /// Returns an error if the group or factor does not exist.
    pub fn market_caps(&self, group: &str, factor: &str) -> Result<Vec<i64>> {
        Ok(self
            .frame(group, factor)?
            .rank_values(MARKET_CAP_RANK)
            .unwrap_or_default())
    }

    /// Distinct values of every factor rank column other than `rank_ME`.
    ///
    /// # Errors
    /// Returns an error if the group or factor does not exist.
    pub fn factor_ranks(&self, group: &str, factor: &str) -> Result<BTreeMap<String, Vec<i64>>> {
        let frame = self.frame(group, factor)?;
        Ok(frame
            .rank_columns()
            .filter(|c| *c != MARKET_CAP_RANK)
            .filter_map(|c| Some((c.to_string(), frame.rank_values(c)?)))
            .collect())
    }

    /// Filtered, date-sorted return table for a query.
    ///
    /// # Errors
    /// Returns an error if the factor does not exist, a filter names a
    /// missing rank column, or the filters leave several rows per month.
    pub fn load_series(&self, query: &SeriesQuery) -> Result<ReturnTable> {
        let frame = self.frame(&query.group, &query.factor)?;
        let label = query.label();
        let table = match &query.column {
            Some(column) => frame.select_column(&label, &query.filters(), column)?,
            None => frame.select(&label, &query.filters())?,
        };
        if table.is_empty() {
            tracing::warn!(series = %query.label(), "selection matched no rows");
        }
        Ok(table)
    }

    /// Whether a market portfolio file was loaded.
    pub const fn has_market(&self) -> bool {
        self.market.is_some()
    }

    /// Market portfolio for one market-cap bucket, or `None` when no market
    /// file was loaded.
    ///
    /// # Errors
    /// Returns an error if the market file has several rows per month for
    /// the bucket.
    pub fn market_portfolio(&self, rank_me: i64) -> Result<Option<ReturnTable>> {
        self.market_table(rank_me, None)
    }

    /// Market portfolio projected onto one return column, or `None` when no
    /// market file was loaded.
    ///
    /// # Errors
    /// Returns an error if the column is missing or the market file has
    /// several rows per month for the bucket.
    pub fn market_column(&self, rank_me: i64, column: &str) -> Result<Option<ReturnTable>> {
        self.market_table(rank_me, Some(column))
    }

    fn market_table(&self, rank_me: i64, column: Option<&str>) -> Result<Option<ReturnTable>> {
        let Some(market) = &self.market else {
            return Ok(None);
        };
        let mut filters = BTreeMap::new();
        if market.rank_values(MARKET_CAP_RANK).is_some() {
            filters.insert(MARKET_CAP_RANK.to_string(), rank_me);
        }
        let table = match column {
            Some(column) => market.select_column("market", &filters, column)?,
            None => market.select("market", &filters)?,
        };
        Ok(Some(table))
    }
}
