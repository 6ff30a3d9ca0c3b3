//! Run controller.
//!
//! Owns the page loop: fetch, classify, extract, dedup, budget, enrich,
//! store, paginate. Budgets are enforced before commit, so the sink never
//! sees a record past `max_lawyers` and the run stops mid-page once the
//! budget fills. Counters advance only after a page's batch is committed.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use url::Url;

use super::blocking;
use super::dedup::DedupLedger;
use super::enrich::EnrichmentScheduler;
use super::escalation::EscalationState;
use super::pagination;
use super::stats::RunStats;
use crate::config::ScrapeConfig;
use crate::extractors::StrategyCascade;
use crate::records::LawyerRecord;
use crate::sink::{DebugSnapshot, DiagnosticsWriter, RecordSink};
use crate::transport::{FetchResult, Transport};

pub struct ScrapeRunner {
    config: ScrapeConfig,
    transport: Arc<dyn Transport>,
    cascade: StrategyCascade,
    ledger: DedupLedger,
    enricher: EnrichmentScheduler,
    sink: Arc<dyn RecordSink>,
    diagnostics: DiagnosticsWriter,
}

impl ScrapeRunner {
    #[must_use]
    pub fn new(
        config: ScrapeConfig,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        let cascade = StrategyCascade::new(Arc::clone(&transport));
        let enricher =
            EnrichmentScheduler::new(Arc::clone(&transport), config.enrich_concurrency);
        let diagnostics = DiagnosticsWriter::new(config.diagnostics_dir.clone());

        Self {
            config,
            transport,
            cascade,
            ledger: DedupLedger::new(),
            enricher,
            sink,
            diagnostics,
        }
    }

    /// Drive the run to completion and return its statistics.
    ///
    /// Terminates on: no next page, the page budget, the record budget, a
    /// page still blocked after escalation, or a transport failure (the
    /// next-page link lives in the page that failed to fetch, so there is
    /// nothing to continue from). Mid-run termination still returns the
    /// accumulated statistics; records already committed to the sink are
    /// never discarded.
    pub async fn run(&mut self) -> Result<RunStats> {
        let mut current_url = self
            .config
            .listing_url()
            .context("Cannot start run without a listing URL")?;
        let mut escalation = EscalationState::new();
        let mut stats = RunStats::new();

        info!("Starting run at {current_url}");

        loop {
            if self.config.max_pages > 0 && stats.pages_processed >= self.config.max_pages {
                info!("Page budget of {} reached, stopping", self.config.max_pages);
                break;
            }

            let page = match self.fetch_usable(&current_url, &mut escalation).await {
                Ok(Some(page)) => page,
                Ok(None) => {
                    warn!("Page {current_url} still blocked after escalation, stopping run");
                    break;
                }
                Err(e) => {
                    warn!("Giving up on {current_url} after transport retries, ending run: {e}");
                    break;
                }
            };

            let outcome = self.cascade.run(&page).await;

            let admitted: Vec<LawyerRecord> = outcome
                .records
                .into_iter()
                .filter(|record| self.ledger.admit(record))
                .collect();
            debug!(
                "{} admitted after dedup for {}",
                admitted.len(),
                page.url
            );

            let batch = self.apply_record_budget(admitted, stats.total_records_stored);

            let batch = if self.config.fetch_full_profiles && !batch.is_empty() {
                self.enricher.enrich_batch(batch, escalation.mode()).await
            } else {
                batch
            };

            self.sink
                .store_batch(&batch)
                .await
                .with_context(|| format!("Failed to store batch for {}", page.url))?;
            stats.record_page(&page.url, outcome.strategy, batch.len());

            if outcome.strategy.is_none() && self.config.debug {
                let snapshot = DebugSnapshot::from_fetch(&page, false);
                if let Err(e) = self.diagnostics.write(&snapshot).await {
                    warn!("Failed to write zero-yield snapshot for {}: {e}", page.url);
                }
            }

            if self.config.max_lawyers > 0
                && stats.total_records_stored >= self.config.max_lawyers
            {
                info!(
                    "Record budget of {} reached, stopping",
                    self.config.max_lawyers
                );
                break;
            }

            let Some(base) = Url::parse(&page.final_url)
                .or_else(|_| Url::parse(&page.url))
                .ok()
            else {
                break;
            };
            match pagination::next_url(&page.body, &base) {
                Some(next) => {
                    debug!("Next page: {next}");
                    current_url = next.to_string();
                }
                None => {
                    info!("No next page after {}, run complete", page.url);
                    break;
                }
            }

            if self.config.page_delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(
                    self.config.page_delay_ms,
                ))
                .await;
            }
        }

        info!(
            "Run finished: {} record(s) over {} page(s)",
            stats.total_records_stored, stats.pages_processed
        );
        Ok(stats)
    }

    /// Fetch a page, escalating once if the response classifies as blocked.
    ///
    /// Returns None when the page is blocked and no escalation is left to
    /// try. Transport errors (after the transport's own retries) propagate
    /// to the page loop, which logs them and ends the run.
    async fn fetch_usable(
        &self,
        url: &str,
        escalation: &mut EscalationState,
    ) -> Result<Option<FetchResult>> {
        let page = self
            .transport
            .fetch(url, escalation.mode())
            .await
            .with_context(|| format!("Fetch failed for {url}"))?;

        if !blocking::classify(&page).blocked {
            escalation.record_clear();
            return Ok(Some(page));
        }

        if !escalation.record_blocked() {
            // Already rendered, nothing further to escalate to.
            self.snapshot_blocked(&page).await;
            return Ok(None);
        }

        let retried = self
            .transport
            .fetch(url, escalation.mode())
            .await
            .with_context(|| format!("Rendered fetch failed for {url}"))?;

        if blocking::classify(&retried).blocked {
            escalation.record_blocked();
            self.snapshot_blocked(&retried).await;
            return Ok(None);
        }

        escalation.record_clear();
        Ok(Some(retried))
    }

    async fn snapshot_blocked(&self, page: &FetchResult) {
        if !self.config.debug {
            return;
        }
        let snapshot = DebugSnapshot::from_fetch(page, true);
        if let Err(e) = self.diagnostics.write(&snapshot).await {
            warn!("Failed to write blocked snapshot for {}: {e}", page.url);
        }
    }

    /// Trim a page's admitted batch to whatever budget remains.
    fn apply_record_budget(
        &self,
        mut batch: Vec<LawyerRecord>,
        already_stored: usize,
    ) -> Vec<LawyerRecord> {
        if self.config.max_lawyers == 0 {
            return batch;
        }
        let remaining = self.config.max_lawyers.saturating_sub(already_stored);
        if batch.len() > remaining {
            debug!(
                "Truncating batch of {} to remaining budget of {remaining}",
                batch.len()
            );
            batch.truncate(remaining);
        }
        batch
    }
}
