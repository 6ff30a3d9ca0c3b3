//! Framework-state strategy: the `__NEXT_DATA__` bootstrap blob.
//!
//! Sites built on the framework embed their whole server-rendered state as
//! one well-known JSON script. When present it parses cleanly and the
//! generic walk does the rest.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;

use super::{Extractor, json_walk, page_url};
use crate::records::LawyerRecord;
use crate::transport::FetchResult;

pub struct FrameworkStateExtractor;

impl FrameworkStateExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FrameworkStateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for FrameworkStateExtractor {
    fn name(&self) -> &'static str {
        "framework-state"
    }

    async fn extract(&self, page: &FetchResult) -> Vec<LawyerRecord> {
        let Some(base) = page_url(page) else {
            return Vec::new();
        };
        let Ok(selector) = Selector::parse(r#"script[id="__NEXT_DATA__"]"#) else {
            return Vec::new();
        };

        let document = Html::parse_document(&page.body);
        let Some(script) = document.select(&selector).next() else {
            return Vec::new();
        };

        let text: String = script.text().collect();
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(value) => json_walk::walk(&value, &base),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FetchMode;

    fn page(body: &str) -> FetchResult {
        FetchResult {
            url: "https://example.com/lawyers/tax/austin-tx".to_string(),
            final_url: "https://example.com/lawyers/tax/austin-tx".to_string(),
            status_code: 200,
            body: body.to_string(),
            mode: FetchMode::Lightweight,
        }
    }

    #[tokio::test]
    async fn test_extracts_from_state_blob() {
        let body = r#"<html><script id="__NEXT_DATA__" type="application/json">
        {"props": {"pageProps": {"lawyers": [
            {"name": "Jane Doe", "profileUrl": "/lawyers/tax/jane-doe"},
            {"name": "John Roe", "profileUrl": "/lawyers/tax/john-roe"}
        ]}}}
        </script></html>"#;

        let records = FrameworkStateExtractor::new().extract(&page(body)).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Jane Doe");
        assert_eq!(records[1].name, "John Roe");
    }

    #[tokio::test]
    async fn test_absent_blob_yields_empty() {
        let body = "<html><script>var x = 1;</script></html>";
        assert!(
            FrameworkStateExtractor::new()
                .extract(&page(body))
                .await
                .is_empty()
        );
    }
}
