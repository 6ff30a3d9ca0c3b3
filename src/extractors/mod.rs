//! Extraction strategies and the cascade that orders them.
//!
//! Every strategy implements one capability trait and never fails: malformed
//! input yields an empty list and the cascade moves on. Structured sources
//! run first because they are cheaper to parse and less likely to break
//! under markup changes; the heuristic HTML extractor is the last resort.

pub mod api_discovery;
pub mod embedded_json;
pub mod framework_state;
pub mod html_fallback;
pub mod json_ld;
pub mod json_walk;

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use url::Url;

use crate::records::LawyerRecord;
use crate::transport::{FetchResult, Transport};

pub use api_discovery::ApiDiscoveryExtractor;
pub use embedded_json::EmbeddedJsonExtractor;
pub use framework_state::FrameworkStateExtractor;
pub use html_fallback::HtmlFallbackExtractor;
pub use json_ld::JsonLdExtractor;

/// One extraction strategy. `extract` never errors; pages a strategy cannot
/// handle yield an empty list.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Stable strategy name for diagnostics and run statistics.
    fn name(&self) -> &'static str;

    async fn extract(&self, page: &FetchResult) -> Vec<LawyerRecord>;
}

/// What one cascade pass produced.
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    pub records: Vec<LawyerRecord>,
    /// Name of the strategy that produced the records; None on a
    /// zero-yield page (a first-class outcome, not an error).
    pub strategy: Option<&'static str>,
}

/// Ordered strategy dispatch with early exit at the first non-empty result.
pub struct StrategyCascade {
    extractors: Vec<Box<dyn Extractor>>,
}

impl StrategyCascade {
    /// The production cascade in its fixed priority order.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            extractors: vec![
                Box::new(ApiDiscoveryExtractor::new(transport)),
                Box::new(EmbeddedJsonExtractor::new()),
                Box::new(JsonLdExtractor::new()),
                Box::new(FrameworkStateExtractor::new()),
                Box::new(HtmlFallbackExtractor::new()),
            ],
        }
    }

    /// Build a cascade from an explicit strategy list (test seam).
    #[must_use]
    pub fn with_extractors(extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self { extractors }
    }

    /// Try each strategy in order, stopping at the first non-empty result.
    pub async fn run(&self, page: &FetchResult) -> CascadeOutcome {
        for extractor in &self.extractors {
            let records = extractor.extract(page).await;
            if !records.is_empty() {
                debug!(
                    "Strategy {} produced {} record(s) for {}",
                    extractor.name(),
                    records.len(),
                    page.url
                );
                return CascadeOutcome {
                    records,
                    strategy: Some(extractor.name()),
                };
            }
            debug!("Strategy {} empty for {}", extractor.name(), page.url);
        }

        CascadeOutcome {
            records: Vec::new(),
            strategy: None,
        }
    }
}

/// The URL extraction should resolve relative hrefs against: the post-redirect
/// URL when parseable, else the requested one.
#[must_use]
pub fn page_url(page: &FetchResult) -> Option<Url> {
    Url::parse(&page.final_url)
        .or_else(|_| Url::parse(&page.url))
        .ok()
}
