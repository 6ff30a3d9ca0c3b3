//! JSON-LD strategy: schema.org structured data blocks.
//!
//! Unwraps `@graph`/array wrappers and `ItemList`/`itemListElement` nesting,
//! then maps semantic properties (`name`, `worksFor.name`, `address.*`,
//! `telephone`, `knowsAbout`, `knowsLanguage`) onto records.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use url::Url;

use super::{Extractor, page_url};
use crate::records::{LawyerRecord, join_practice_areas};
use crate::transport::FetchResult;
use crate::utils::url_utils::absolutize;

pub struct JsonLdExtractor;

impl JsonLdExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonLdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for JsonLdExtractor {
    fn name(&self) -> &'static str {
        "json-ld"
    }

    async fn extract(&self, page: &FetchResult) -> Vec<LawyerRecord> {
        let Some(base) = page_url(page) else {
            return Vec::new();
        };
        let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
            return Vec::new();
        };

        let document = Html::parse_document(&page.body);
        let mut records = Vec::new();

        for script in document.select(&selector) {
            let text: String = script.text().collect();
            if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
                collect(&value, &base, &mut records);
            }
        }

        records
    }
}

/// Unwrap wrapper shapes and map leaf nodes, iteratively.
fn collect(root: &Value, base: &Url, records: &mut Vec<LawyerRecord>) {
    let mut work: Vec<&Value> = vec![root];

    // Children are pushed in reverse so pop order matches document order.
    while let Some(node) = work.pop() {
        match node {
            Value::Array(items) => work.extend(items.iter().rev()),
            Value::Object(obj) => {
                if let Some(Value::Array(graph)) = obj.get("@graph") {
                    work.extend(graph.iter().rev());
                    continue;
                }
                if let Some(Value::Array(elements)) = obj.get("itemListElement") {
                    // ListItem wrappers carry the payload under "item".
                    for element in elements.iter().rev() {
                        match element.get("item") {
                            Some(item) => work.push(item),
                            None => work.push(element),
                        }
                    }
                    continue;
                }
                if let Some(record) = map_node(obj, base) {
                    records.push(record);
                }
            }
            _ => {}
        }
    }
}

/// Map one schema.org node onto a record. Nodes without a name or URL are
/// not directory entries and are skipped.
fn map_node(obj: &Map<String, Value>, base: &Url) -> Option<LawyerRecord> {
    let mut record = LawyerRecord::new();

    if let Some(name) = str_prop(obj, "name") {
        record.set_name(&name);
    }

    record.firm_name = match obj.get("worksFor") {
        Some(Value::Object(firm)) => str_prop(firm, "name"),
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    };

    if let Some(Value::Object(address)) = obj.get("address") {
        record.address = compose_address(address);
        record.location = compose_locality(address);
    }

    record.phone = str_prop(obj, "telephone");
    record.email = str_prop(obj, "email").map(|e| e.trim_start_matches("mailto:").to_string());
    record.profile_url = str_prop(obj, "url")
        .and_then(|href| absolutize(&href, base))
        .map(|u| u.to_string());
    record.practice_areas = str_list_prop(obj, "knowsAbout").and_then(join_practice_areas);
    record.languages = str_list_prop(obj, "knowsLanguage").filter(|v| !v.is_empty());
    record.description = str_prop(obj, "description");

    (record.has_name() || record.profile_url.is_some()).then_some(record)
}

fn str_prop(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// A property that schema.org allows as either a string or an array.
fn str_list_prop(obj: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(vec![s.trim().to_string()]),
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Object(o) => str_prop(o, "name"),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

fn compose_address(address: &Map<String, Value>) -> Option<String> {
    let parts: Vec<String> = ["streetAddress", "addressLocality", "addressRegion", "postalCode"]
        .iter()
        .filter_map(|key| str_prop(address, key))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn compose_locality(address: &Map<String, Value>) -> Option<String> {
    let locality = str_prop(address, "addressLocality");
    let region = str_prop(address, "addressRegion");
    match (locality, region) {
        (Some(l), Some(r)) => Some(format!("{l}, {r}")),
        (Some(l), None) => Some(l),
        (None, Some(r)) => Some(r),
        (None, None) => None,
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
    async fn test_item_list_with_nested_items() {
        let body = r#"<html><script type="application/ld+json">
        {
            "@type": "ItemList",
            "itemListElement": [
                {
                    "@type": "ListItem",
                    "position": 1,
                    "item": {
                        "@type": "Attorney",
                        "name": "Jane Doe",
                        "worksFor": {"name": "Doe LLP"},
                        "telephone": "512-555-0100",
                        "url": "/lawyers/tax/jane-doe",
                        "knowsAbout": ["Tax Law", "Estate Planning"],
                        "knowsLanguage": ["English", "Spanish"],
                        "address": {
                            "streetAddress": "100 Congress Ave",
                            "addressLocality": "Austin",
                            "addressRegion": "TX",
                            "postalCode": "78701"
                        }
                    }
                }
            ]
        }
        </script></html>"#;

        let records = JsonLdExtractor::new().extract(&page(body)).await;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.firm_name.as_deref(), Some("Doe LLP"));
        assert_eq!(record.location.as_deref(), Some("Austin, TX"));
        assert_eq!(
            record.address.as_deref(),
            Some("100 Congress Ave, Austin, TX, 78701")
        );
        assert_eq!(record.practice_areas.as_deref(), Some("Tax Law, Estate Planning"));
        assert_eq!(
            record.languages.as_deref(),
            Some(["English".to_string(), "Spanish".to_string()].as_slice())
        );
        assert_eq!(
            record.profile_url.as_deref(),
            Some("https://example.com/lawyers/tax/jane-doe")
        );
    }

    #[tokio::test]
    async fn test_graph_wrapper() {
        let body = r#"<html><script type="application/ld+json">
        {"@graph": [
            {"@type": "Person", "name": "John Roe", "url": "https://example.com/lawyers/ip/john-roe"},
            {"@type": "WebSite", "publisher": "irrelevant"}
        ]}
        </script></html>"#;

        let records = JsonLdExtractor::new().extract(&page(body)).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "John Roe");
    }

    #[tokio::test]
    async fn test_malformed_block_yields_empty() {
        let body = r#"<html><script type="application/ld+json">{oops</script></html>"#;
        assert!(JsonLdExtractor::new().extract(&page(body)).await.is_empty());
    }
}
