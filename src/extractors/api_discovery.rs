//! JSON-API-discovery strategy.
//!
//! Pages that render their listings client-side usually leak the API
//! endpoint they call as a quoted URL in the markup. This strategy scans
//! the body for same-origin JSON/API endpoint candidates, fetches the first
//! one through the lightweight transport, and walks the response.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use log::debug;
use regex::Regex;
use serde_json::Value;
use url::Url;

use super::{Extractor, json_walk, page_url};
use crate::records::LawyerRecord;
use crate::transport::{FetchMode, FetchResult, Transport};
use crate::utils::url_utils::{absolutize, same_origin};

/// Quoted URL-shaped substrings that look like API or JSON endpoints.
/// Compiled once; the scan runs on every page in lightweight mode.
static API_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']([^"'\s<>]*(?:/api/|\.json)[^"'\s<>]*)["']"#)
        .expect("API URL pattern is a valid regex")
});

pub struct ApiDiscoveryExtractor {
    transport: Arc<dyn Transport>,
}

impl ApiDiscoveryExtractor {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Same-origin API endpoint candidates in order of appearance.
    fn candidates(body: &str, base: &Url) -> Vec<Url> {
        let mut seen = Vec::new();
        for capture in API_URL_PATTERN.captures_iter(body) {
            let Some(raw) = capture.get(1) else { continue };
            let Some(resolved) = absolutize(raw.as_str(), base) else {
                continue;
            };
            if same_origin(&resolved, base) && !seen.contains(&resolved) {
                seen.push(resolved);
            }
        }
        seen
    }
}

#[async_trait]
impl Extractor for ApiDiscoveryExtractor {
    fn name(&self) -> &'static str {
        "api-discovery"
    }

    /// The follow-up fetch is always lightweight, even after the run has
    /// escalated: the candidate is a JSON endpoint, and navigating a browser
    /// to raw JSON wraps it in viewer markup instead of returning the body.
    async fn extract(&self, page: &FetchResult) -> Vec<LawyerRecord> {
        let Some(base) = page_url(page) else {
            return Vec::new();
        };

        let Some(endpoint) = Self::candidates(&page.body, &base).into_iter().next() else {
            return Vec::new();
        };

        debug!("Discovered API candidate {endpoint} on {}", page.url);
        let response = match self
            .transport
            .fetch(endpoint.as_str(), FetchMode::Lightweight)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                debug!("API candidate fetch failed for {endpoint}: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&response.body) {
            Ok(value) => json_walk::walk(&value, &base),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    struct StaticTransport {
        body: &'static str,
    }

    #[async_trait]
    impl Transport for StaticTransport {
        async fn fetch(&self, url: &str, mode: FetchMode) -> Result<FetchResult> {
            Ok(FetchResult {
                url: url.to_string(),
                final_url: url.to_string(),
                status_code: 200,
                body: self.body.to_string(),
                mode,
            })
        }
    }

    fn page(body: &str) -> FetchResult {
        FetchResult {
            url: "https://example.com/lawyers/tax/austin-tx".to_string(),
            final_url: "https://example.com/lawyers/tax/austin-tx".to_string(),
            status_code: 200,
            body: body.to_string(),
            mode: FetchMode::Lightweight,
        }
    }

    #[test]
    fn test_candidates_same_origin_only() {
        let base = Url::parse("https://example.com/lawyers/tax/austin-tx").expect("valid");
        let body = r#"
            fetch("/api/search?area=tax");
            load("https://cdn.other.com/api/tracking");
            get("https://example.com/data/list.json");
        "#;
        let candidates = ApiDiscoveryExtractor::candidates(body, &base);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].as_str(), "https://example.com/api/search?area=tax");
        assert_eq!(candidates[1].as_str(), "https://example.com/data/list.json");
    }

    #[tokio::test]
    async fn test_fetches_first_candidate_and_walks() {
        let transport = Arc::new(StaticTransport {
            body: r#"{"results": [{"name": "Jane Doe", "url": "/lawyers/tax/jane-doe"}]}"#,
        });
        let extractor = ApiDiscoveryExtractor::new(transport);
        let body = r#"<script>fetch("/api/lawyers?page=1")</script>"#;

        let records = extractor.extract(&page(body)).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_no_candidates_yields_empty() {
        let transport = Arc::new(StaticTransport { body: "{}" });
        let extractor = ApiDiscoveryExtractor::new(transport);
        let records = extractor.extract(&page("<html>no endpoints</html>")).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_non_json_response_yields_empty() {
        let transport = Arc::new(StaticTransport {
            body: "<html>not json</html>",
        });
        let extractor = ApiDiscoveryExtractor::new(transport);
        let body = r#"<script>fetch("/api/lawyers")</script>"#;
        assert!(extractor.extract(&page(body)).await.is_empty());
    }
}
