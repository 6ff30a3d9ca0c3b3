//! Zero-yield page diagnostics.
//!
//! When debug mode is on and a page yields no records, a bounded snapshot
//! of what was fetched is persisted so selector drift can be diagnosed
//! offline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use crate::transport::FetchResult;
use crate::utils::constants::SNAPSHOT_EXCERPT_BYTES;

/// What gets persisted for a zero-yield page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot {
    pub url: String,
    pub status_code: u16,
    pub blocked: bool,
    /// Bounded body prefix, enough to see what the server actually sent.
    pub html_excerpt: String,
    pub timestamp: DateTime<Utc>,
}

impl DebugSnapshot {
    #[must_use]
    pub fn from_fetch(page: &FetchResult, blocked: bool) -> Self {
        let limit = page.body.len().min(SNAPSHOT_EXCERPT_BYTES);
        let cut = (0..=limit)
            .rev()
            .find(|&i| page.body.is_char_boundary(i))
            .unwrap_or(0);

        Self {
            url: page.url.clone(),
            status_code: page.status_code,
            blocked,
            html_excerpt: page.body[..cut].to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Writes snapshots into a directory, one JSON file per zero-yield page.
pub struct DiagnosticsWriter {
    dir: PathBuf,
    counter: std::sync::atomic::AtomicUsize,
}

impl DiagnosticsWriter {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            counter: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Persist one snapshot. Failures are reported to the caller but are
    /// expected to be logged and ignored; diagnostics never stop a run.
    pub async fn write(&self, snapshot: &DebugSnapshot) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create diagnostics dir {}", self.dir.display()))?;

        let seq = self
            .counter
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let path = self.dir.join(format!("zero-yield-{seq:04}.json"));

        let payload =
            serde_json::to_vec_pretty(snapshot).context("Failed to serialize snapshot")?;
        tokio::fs::write(&path, payload)
            .await
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;

        debug!("Wrote zero-yield snapshot for {} to {}", snapshot.url, path.display());
        Ok(())
    }
}
