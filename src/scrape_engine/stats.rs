//! Per-run statistics.
//!
//! Collected by the runner as pages are processed and emitted once at the
//! end of the run, alongside (never instead of) the stored records.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Which strategy produced a given page's records.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStrategy {
    pub url: String,
    /// None marks a zero-yield page.
    pub strategy: Option<String>,
}

/// Summary of one completed run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total_records_stored: usize,
    pub pages_processed: usize,
    /// One entry per processed page, in processing order.
    pub strategy_used_per_page: Vec<PageStrategy>,
    pub timestamp: DateTime<Utc>,
}

impl RunStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_records_stored: 0,
            pages_processed: 0,
            strategy_used_per_page: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Record one processed page. Counters only advance here, after the
    /// page's batch has been committed to the sink.
    pub fn record_page(&mut self, url: &str, strategy: Option<&str>, stored: usize) {
        self.pages_processed += 1;
        self.total_records_stored += stored;
        self.strategy_used_per_page.push(PageStrategy {
            url: url.to_string(),
            strategy: strategy.map(str::to_string),
        });
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}
