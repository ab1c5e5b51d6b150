//! Writing a whole report to a directory.

use crate::analysis::AnalysisReport;
use crate::error::Result;
use factorscope_output::{ExportError, ExportFormat, Exporter};
use std::fs;
use std::path::{Path, PathBuf};

/// File stem for a series id, e.g. `value/bm` as `value_bm`.
pub fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

impl AnalysisReport {
    /// Export every table of the report into `dir`, one file per table.
    ///
    /// Returns the written paths.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or a file cannot
    /// be written.
    pub fn export_to_dir(&self, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(ExportError::from)?;
        let mut written = Vec::new();
        let mut write = |stem: &str, item: &dyn Exporter| -> Result<()> {
            let path = dir.join(format!("{stem}.{}", format.extension()));
            item.export_to_file(&path, format)?;
            written.push(path);
            Ok(())
        };

        write("statistics", &self.statistics_table())?;
        for report in &self.series {
            write(&format!("series_{}", file_stem(&report.id)), &report.series)?;
        }
        if let Some(blended) = &self.blended {
            write("blend", blended)?;
        }
        write("rolling", &self.focus.rolling)?;
        write("drawdown", &self.focus.drawdown)?;
        write("relative", &self.focus.relative)?;
        write("focus_statistics", &self.focus.statistics_table())?;
        if let Some(quantiles) = &self.focus.quantiles {
            write("quantiles", quantiles)?;
        }
        if let Some(correlations) = &self.correlations {
            write("correlations", correlations)?;
        }

        tracing::info!(dir = %dir.display(), files = written.len(), "report exported");
        Ok(written)
    }
}
