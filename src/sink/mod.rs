//! Result storage seam.
//!
//! The pipeline hands records off in admission order, one batch per
//! processed page, and never touches them again. `JsonlSink` is the
//! production implementation; `MemorySink` backs the pipeline tests.

pub mod diagnostics;
pub mod json_sink;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::records::LawyerRecord;

pub use diagnostics::{DebugSnapshot, DiagnosticsWriter};
pub use json_sink::JsonlSink;

/// Destination for admitted, optionally-enriched records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Store one page's batch, in admission order.
    async fn store_batch(&self, records: &[LawyerRecord]) -> Result<()>;
}

/// In-memory sink for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    stored: Mutex<Vec<LawyerRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything stored so far, in storage order.
    pub async fn records(&self) -> Vec<LawyerRecord> {
        self.stored.lock().await.clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn store_batch(&self, records: &[LawyerRecord]) -> Result<()> {
        self.stored.lock().await.extend_from_slice(records);
        Ok(())
    }
}
