//! Lightweight HTTP transport built on reqwest.
//!
//! Handles bounded retries for transport-level failures. Blocked responses
//! (403/429/503, challenge interstitials) are returned to the caller intact;
//! classifying and reacting to them is the pipeline's job, and retrying
//! against an active challenge in this mode is presumed futile.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, warn};

use super::{FetchMode, FetchResult};
use crate::utils::constants::{CHROME_USER_AGENT, RETRY_BACKOFF_MS};

/// Statuses that get retried as transient server failures. 503 is excluded:
/// it doubles as a rate-limit signal and belongs to the blocking detector.
const RETRYABLE_STATUSES: [u16; 3] = [500, 502, 504];

pub struct HttpClient {
    client: reqwest::Client,
    retry_attempts: u32,
}

impl HttpClient {
    /// Build the underlying reqwest client.
    ///
    /// # Errors
    /// Returns an error if the TLS backend fails to initialize.
    pub fn new(request_timeout_secs: u64, retry_attempts: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .user_agent(CHROME_USER_AGENT)
            .gzip(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            retry_attempts: retry_attempts.max(1),
        })
    }

    /// Fetch a URL with bounded retries and linear backoff.
    ///
    /// # Errors
    /// Returns an error once every attempt has failed at the transport level.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult> {
        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 1..=self.retry_attempts {
            if attempt > 1 {
                let backoff = Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt - 1));
                debug!("Retry {attempt}/{} for {url} after {backoff:?}", self.retry_attempts);
                tokio::time::sleep(backoff).await;
            }

            match self.attempt(url).await {
                Ok(result) => {
                    if RETRYABLE_STATUSES.contains(&result.status_code)
                        && attempt < self.retry_attempts
                    {
                        warn!(
                            "Transient HTTP {} from {url}, attempt {attempt}/{}",
                            result.status_code, self.retry_attempts
                        );
                        last_error = Some(anyhow::anyhow!(
                            "HTTP {} from {url}",
                            result.status_code
                        ));
                        continue;
                    }
                    return Ok(result);
                }
                Err(e) => {
                    warn!("Fetch failed for {url} (attempt {attempt}/{}): {e}", self.retry_attempts);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Fetch failed for {url}")))
    }

    async fn attempt(&self, url: &str) -> Result<FetchResult> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .with_context(|| format!("Request failed for {url}"))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read body from {url}"))?;

        Ok(FetchResult {
            url: url.to_string(),
            final_url,
            status_code,
            body,
            mode: FetchMode::Lightweight,
        })
    }
}
