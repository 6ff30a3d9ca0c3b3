//! NDJSON file sink.
//!
//! One serialized record per line, appended per batch. The parent
//! directory is created on first write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use tokio::io::AsyncWriteExt;

use super::RecordSink;
use crate::records::LawyerRecord;

pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl RecordSink for JsonlSink {
    async fn store_batch(&self, records: &[LawyerRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }

        let mut buffer = String::new();
        for record in records {
            let line = serde_json::to_string(record).context("Failed to serialize record")?;
            buffer.push_str(&line);
            buffer.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open output file {}", self.path.display()))?;
        file.write_all(buffer.as_bytes())
            .await
            .context("Failed to write records")?;
        file.flush().await.context("Failed to flush records")?;

        debug!("Stored {} record(s) to {}", records.len(), self.path.display());
        Ok(())
    }
}
