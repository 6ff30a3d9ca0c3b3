//! Embedded-JSON strategy: record payloads inlined in script blocks.
//!
//! Scans inline scripts whose raw text mentions a domain keyword before
//! attempting any parse, then tries the whole payload and falls back to a
//! brace-matched substring. Parsed values go through the generic walk.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;

use super::{Extractor, json_walk, page_url};
use crate::records::LawyerRecord;
use crate::transport::FetchResult;

/// Keywords an interesting payload mentions. Cheap pre-filter so we do not
/// run the parser over analytics and framework bootstrap scripts.
const DOMAIN_KEYWORDS: [&str; 3] = ["lawyer", "attorney", "results"];

pub struct EmbeddedJsonExtractor;

impl EmbeddedJsonExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmbeddedJsonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for EmbeddedJsonExtractor {
    fn name(&self) -> &'static str {
        "embedded-json"
    }

    async fn extract(&self, page: &FetchResult) -> Vec<LawyerRecord> {
        let Some(base) = page_url(page) else {
            return Vec::new();
        };
        let Ok(selector) = Selector::parse("script") else {
            return Vec::new();
        };

        let document = Html::parse_document(&page.body);
        let mut records = Vec::new();

        for script in document.select(&selector) {
            // JSON-LD has its own strategy with semantic mapping.
            if script.value().attr("type") == Some("application/ld+json") {
                continue;
            }

            let text: String = script.text().collect();
            let lowered = text.to_lowercase();
            if !DOMAIN_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
                continue;
            }

            let parsed = serde_json::from_str::<Value>(text.trim())
                .ok()
                .or_else(|| {
                    brace_matched_json(&text)
                        .and_then(|candidate| serde_json::from_str::<Value>(candidate).ok())
                });

            if let Some(value) = parsed {
                records.extend(json_walk::walk(&value, &base));
            }
        }

        records
    }
}

/// Best-effort extraction of the first balanced `{...}` substring.
///
/// Tracks string literals and escapes so braces inside values do not skew
/// the depth count. Returns None when no balanced object exists.
#[must_use]
pub fn brace_matched_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
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
    async fn test_extracts_whole_script_payload() {
        let body = r#"<html><script>
            {"results": [{"name": "Jane Doe", "url": "/lawyers/tax/jane-doe"}]}
        </script></html>"#;
        let records = EmbeddedJsonExtractor::new().extract(&page(body)).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_brace_matched_fallback_inside_assignment() {
        let body = r#"<html><script>
            window.__SEARCH__ = {"attorneys": [{"name": "John Roe", "phone": "555-0101"}]};
        </script></html>"#;
        let records = EmbeddedJsonExtractor::new().extract(&page(body)).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "John Roe");
    }

    #[tokio::test]
    async fn test_keyword_filter_skips_unrelated_scripts() {
        let body = r#"<html><script>
            var config = {"items": [{"name": "Not A Directory Entry"}]};
        </script></html>"#;
        let records = EmbeddedJsonExtractor::new().extract(&page(body)).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload_yields_empty() {
        let body = r#"<html><script>var lawyers = {broken json</script></html>"#;
        let records = EmbeddedJsonExtractor::new().extract(&page(body)).await;
        assert!(records.is_empty());
    }

    #[test]
    fn test_brace_matching_respects_strings() {
        let text = r#"prefix {"a": "val with } brace", "b": {"c": 1}} suffix"#;
        let matched = brace_matched_json(text).expect("should match");
        assert_eq!(matched, r#"{"a": "val with } brace", "b": {"c": 1}}"#);
    }

    #[test]
    fn test_brace_matching_unbalanced_returns_none() {
        assert!(brace_matched_json("{\"a\": {").is_none());
        assert!(brace_matched_json("no braces here").is_none());
    }
}
