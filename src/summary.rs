//! Summary Reporter.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use print_artifacts::paths::{atomic_write_blocking, summary_chart_path, summary_path};
use print_types::RunCounters;
use tracing::error;

use crate::chart::render_pie_png;

/// Final numbers of one print job.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub print_name: String,
    pub counters: RunCounters,
}

impl SummaryReport {
    pub fn new(print_name: impl Into<String>, counters: RunCounters) -> Self {
        Self {
            print_name: print_name.into(),
            counters,
        }
    }

    /// Text body of `print_summary.txt`.
    pub fn render(&self) -> String {
        let errors = serde_json::to_string(&self.counters.error_log)
            .unwrap_or_else(|_| "[]".to_string());
        format!(
            "Print Name: {}\nTotal Layers: {}\nSuccessful Layers: {}\nFailed Layers: {}\nErrors: {}\n",
            self.print_name,
            self.counters.total_layers,
            self.counters.successful_layers,
            self.counters.failed_layers,
            errors,
        )
    }

    pub fn write_text(&self, output: &Path) -> Result<PathBuf> {
        let path = summary_path(output);
        atomic_write_blocking(&path, self.render().as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn write_chart(&self, output: &Path) -> Result<PathBuf> {
        let path = summary_chart_path(output);
        let png = render_pie_png(self.counters.successful_layers, self.counters.failed_layers)
            .context("failed to render summary chart")?;
        atomic_write_blocking(&path, &png)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write both artifacts and report each one.
    ///
    /// Failures are reported but not returned: the run they describe is over
    /// either way. Returns true if both artifacts were written.
    pub fn publish(&self, output: &Path) -> bool {
        let text = match self.write_text(output) {
            Ok(path) => {
                println!("Print summary saved to {}", path.display());
                true
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "summary file not written");
                println!("Error writing summary file: {err:#}");
                false
            }
        };
        let chart = match self.write_chart(output) {
            Ok(path) => {
                println!("Print summary chart saved to {}", path.display());
                true
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "summary chart not written");
                println!("Error generating summary chart: {err:#}");
                false
            }
        };
        text && chart
    }
}
