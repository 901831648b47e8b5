//! Append-only result log.
//!
//! One file per (keyword, country), one `YYYY-MM-DD|link|position` line per
//! collected item. Earlier runs are never rewritten.

use crate::search::SearchOutcome;
use chrono::NaiveDate;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to write results to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result log for one keyword and country
#[derive(Debug, Clone)]
pub struct ResultSink {
    path: PathBuf,
}

impl ResultSink {
    pub fn new(dir: impl AsRef<Path>, keyword: &str, country: &str) -> Self {
        Self {
            path: dir.as_ref().join(file_name(keyword, country)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append every collected item of `outcome`, dated `date`.
    ///
    /// Returns the number of lines written.
    pub fn append(&self, outcome: &SearchOutcome, date: NaiveDate) -> Result<usize, SinkError> {
        let date = date.format("%Y-%m-%d").to_string();
        let mut block = String::new();
        for item in outcome.items() {
            block.push_str(&format!("{}|{}|{}\n", date, item.link, item.position));
        }

        let io_err = |source| SinkError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(block.as_bytes()).map_err(io_err)?;

        tracing::debug!(
            file = %self.path.display(),
            lines = outcome.len(),
            "appended results"
        );

        Ok(outcome.len())
    }

    /// Append with today's local date.
    pub fn append_today(&self, outcome: &SearchOutcome) -> Result<usize, SinkError> {
        self.append(outcome, chrono::Local::now().date_naive())
    }
}

/// `seo_results_<keyword with spaces as underscores>_<country>.txt`
pub fn file_name(keyword: &str, country: &str) -> String {
    format!("seo_results_{}_{}.txt", keyword.replace(' ', "_"), country)
}
