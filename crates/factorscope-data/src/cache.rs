//! Memoized file loads keyed by path and modification time.

use crate::error::Result;
use crate::frame::FactorFrame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Cache hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Loads served from memory
    pub hits: usize,
    /// Loads that parsed the file
    pub misses: usize,
}

#[derive(Debug)]
struct Entry {
    modified: SystemTime,
    frame: Arc<FactorFrame>,
}

/// Parsed files keyed by path; an entry is reused only while the file's
/// modification time is unchanged.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<PathBuf, Entry>,
    stats: CacheStats,
}

impl LoadCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached frame for `path`, or parse it with `load`.
    ///
    /// # Errors
    /// Returns an error if the file metadata cannot be read or `load` fails.
    pub fn get_or_load<F>(&mut self, path: &Path, load: F) -> Result<Arc<FactorFrame>>
    where
        F: FnOnce(&Path) -> Result<FactorFrame>,
    {
        let modified = std::fs::metadata(path)?.modified()?;

        if let Some(entry) = self.entries.get(path)
            && entry.modified == modified
        {
            self.stats.hits += 1;
            return Ok(Arc::clone(&entry.frame));
        }

        tracing::debug!(path = %path.display(), "loading file");
        let frame = Arc::new(load(path)?);
        self.stats.misses += 1;
        self.entries.insert(
            path.to_path_buf(),
            Entry {
                modified,
                frame: Arc::clone(&frame),
            },
        );
        Ok(frame)
    }

    /// Drop entries whose path is not in `live`.
    pub fn retain_paths(&mut self, live: &[PathBuf]) {
        self.entries.retain(|path, _| live.contains(path));
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit and miss counters since creation.
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_second_load_is_a_hit() {
        let dir = std::env::temp_dir().join("factorscope_cache_hit");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("portf_x_monthly.csv");
        fs::write(&path, "year,month,ret_vw\n2020,1,1.0\n").unwrap();

        let mut cache = LoadCache::new();
        let first = cache
            .get_or_load(&path, |p| FactorFrame::from_path(p, true))
            .unwrap();
        let second = cache
            .get_or_load(&path, |_| panic!("should be cached"))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(cache.len(), 1);

        cache.retain_paths(&[]);
        assert!(cache.is_empty());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut cache = LoadCache::new();
        let path = std::env::temp_dir().join("factorscope_cache_missing.csv");
        assert!(
            cache
                .get_or_load(&path, |p| FactorFrame::from_path(p, true))
                .is_err()
        );
    }
}
