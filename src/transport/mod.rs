//! Fetch transports: lightweight HTTP and full browser rendering.
//!
//! The pipeline only sees the `Transport` trait; which concrete path a fetch
//! takes is decided by the escalation controller through `FetchMode`.

pub mod browser;
pub mod http;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use browser::BrowserRenderer;
pub use http::HttpClient;

/// How a page is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Plain HTTP GET, no JavaScript execution.
    Lightweight,
    /// Headless browser navigation with full rendering.
    Rendered,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lightweight => write!(f, "lightweight"),
            Self::Rendered => write!(f, "rendered"),
        }
    }
}

/// The outcome of one fetch. Immutable once produced; lives for the duration
/// of a single page-processing cycle.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URL that was requested.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    pub status_code: u16,
    pub body: String,
    pub mode: FetchMode,
}

/// Seam between the pipeline and the network.
///
/// Implementations own retries and per-request timeouts; the pipeline's only
/// cancellation mechanism is its page/record budgets.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<FetchResult>;
}

/// Production transport: reqwest for the lightweight path, a lazily
/// launched chromiumoxide browser for the rendered path.
pub struct NetTransport {
    http: HttpClient,
    renderer: BrowserRenderer,
}

impl NetTransport {
    /// Build both paths. The browser is not launched until the first
    /// rendered fetch, so runs that never get blocked never pay for Chrome.
    pub fn new(
        request_timeout_secs: u64,
        retry_attempts: u32,
        headless: bool,
    ) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(request_timeout_secs, retry_attempts)?,
            renderer: BrowserRenderer::new(headless, request_timeout_secs),
        })
    }

    /// Close the browser if it was ever launched.
    pub async fn shutdown(&self) {
        self.renderer.shutdown().await;
    }
}

#[async_trait]
impl Transport for NetTransport {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<FetchResult> {
        match mode {
            FetchMode::Lightweight => self.http.fetch(url).await,
            FetchMode::Rendered => self.renderer.fetch(url).await,
        }
    }
}
