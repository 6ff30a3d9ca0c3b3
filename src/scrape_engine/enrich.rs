//! Detail-page enrichment under a bounded concurrency ceiling.
//!
//! Augments admitted records with fields only their profile pages carry.
//! Enrichment failure is non-fatal by design: a blocked or unreachable
//! detail page leaves the base record untouched. `buffered` keeps at most
//! N detail fetches in flight while preserving admission order in the
//! output.
//!
//! Merge precedence per field: explicit detail-page markup beats JSON-LD
//! found on the detail page, which beats the base record's value. Empty
//! detail values never erase a non-empty base value.

use std::sync::{Arc, LazyLock};

use futures::{StreamExt, stream};
use log::debug;
use scraper::{Html, Selector};

use super::blocking;
use crate::extractors::{Extractor, JsonLdExtractor};
use crate::records::{LawyerRecord, join_practice_areas};
use crate::transport::{FetchMode, FetchResult, Transport};

struct DetailSelectors {
    biography: Vec<Selector>,
    education: Vec<Selector>,
    admissions: Vec<Selector>,
    languages: Vec<Selector>,
    years_licensed: Vec<Selector>,
    practice: Vec<Selector>,
}

fn parse_all(sources: &[&str]) -> Vec<Selector> {
    sources
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}

static DETAIL: LazyLock<DetailSelectors> = LazyLock::new(|| DetailSelectors {
    biography: parse_all(&[".biography", "#biography", r#"[class*="bio"]"#, ".about-section"]),
    education: parse_all(&[".education li", "#education li", r#"[class*="education"] li"#]),
    admissions: parse_all(&[
        ".bar-admissions li",
        "#admissions li",
        r#"[class*="admission"] li"#,
    ]),
    languages: parse_all(&[".languages li", r#"[class*="language"] li"#]),
    years_licensed: parse_all(&[".years-licensed", r#"[class*="licensed"]"#]),
    practice: parse_all(&[
        ".practice-areas li",
        "#practice-areas li",
        r#"[class*="practice"] li"#,
    ]),
});

pub struct EnrichmentScheduler {
    transport: Arc<dyn Transport>,
    concurrency: usize,
}

impl EnrichmentScheduler {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, concurrency: usize) -> Self {
        Self {
            transport,
            concurrency: concurrency.max(1),
        }
    }

    /// Enrich one page's batch of admitted records.
    ///
    /// Output order matches input (admission) order regardless of which
    /// detail fetches finish first.
    pub async fn enrich_batch(
        &self,
        records: Vec<LawyerRecord>,
        mode: FetchMode,
    ) -> Vec<LawyerRecord> {
        stream::iter(records)
            .map(|record| self.enrich_one(record, mode))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn enrich_one(&self, base: LawyerRecord, mode: FetchMode) -> LawyerRecord {
        if !base.needs_detail() {
            return base;
        }
        let Some(url) = base.profile_url.clone() else {
            return base;
        };

        let detail_page = match self.transport.fetch(&url, mode).await {
            Ok(page) => page,
            Err(e) => {
                debug!("Detail fetch failed for {url}, keeping base record: {e}");
                return base;
            }
        };
        if blocking::classify(&detail_page).blocked {
            debug!("Detail page blocked for {url}, keeping base record");
            return base;
        }

        let mut merged = base;

        // Ascending precedence: JSON-LD first, explicit markup last.
        if let Some(ld) = JsonLdExtractor::new()
            .extract(&detail_page)
            .await
            .into_iter()
            .next()
        {
            merged.merge_detail(&ld);
        }
        merged.merge_detail(&detail_overlay(&detail_page));

        merged
    }
}

/// Pull explicit detail fields out of a profile page's markup.
fn detail_overlay(page: &FetchResult) -> LawyerRecord {
    let document = Html::parse_document(&page.body);
    let root = document.root_element();
    let mut overlay = LawyerRecord::new();

    overlay.biography = first_text(&root, &DETAIL.biography);
    overlay.education = all_texts(&root, &DETAIL.education);
    overlay.bar_admissions = all_texts(&root, &DETAIL.admissions);
    overlay.languages = all_texts(&root, &DETAIL.languages);
    overlay.years_licensed = first_text(&root, &DETAIL.years_licensed);
    overlay.practice_areas = all_texts(&root, &DETAIL.practice)
        .and_then(join_practice_areas);

    overlay
}

fn first_text(scope: &scraper::ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    for selector in selectors {
        for element in scope.select(selector) {
            let text = element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn all_texts(scope: &scraper::ElementRef<'_>, selectors: &[Selector]) -> Option<Vec<String>> {
    for selector in selectors {
        let texts: Vec<String> = scope
            .select(selector)
            .map(|el| {
                el.text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|t| !t.is_empty())
            .collect();
        if !texts.is_empty() {
            return Some(texts);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct DetailTransport {
        body: String,
        status: u16,
    }

    #[async_trait]
    impl Transport for DetailTransport {
        async fn fetch(&self, url: &str, mode: FetchMode) -> Result<FetchResult> {
            Ok(FetchResult {
                url: url.to_string(),
                final_url: url.to_string(),
                status_code: self.status,
                body: self.body.clone(),
                mode,
            })
        }
    }

    fn base_record() -> LawyerRecord {
        let mut record = LawyerRecord::new();
        record.set_name("Jane Doe");
        record.phone = Some("555-0100".to_string());
        record.profile_url = Some("https://example.com/lawyers/tax/jane-doe".to_string());
        record
    }

    #[tokio::test]
    async fn test_detail_fields_merge_in() {
        let transport = Arc::new(DetailTransport {
            status: 200,
            body: r#"<html><body>
                <div class="biography">Practicing tax law since 2001.</div>
                <ul class="education"><li>UT Austin, JD</li></ul>
                <ul class="bar-admissions"><li>Texas</li><li>New York</li></ul>
            </body></html>"#
                .to_string(),
        });
        let scheduler = EnrichmentScheduler::new(transport, 2);

        let out = scheduler
            .enrich_batch(vec![base_record()], FetchMode::Lightweight)
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].biography.as_deref(),
            Some("Practicing tax law since 2001.")
        );
        assert_eq!(
            out[0].bar_admissions.as_deref(),
            Some(["Texas".to_string(), "New York".to_string()].as_slice())
        );
        // Untouched base fields survive.
        assert_eq!(out[0].phone.as_deref(), Some("555-0100"));
    }

    #[tokio::test]
    async fn test_blocked_detail_keeps_base_unchanged() {
        let transport = Arc::new(DetailTransport {
            status: 403,
            body: String::new(),
        });
        let scheduler = EnrichmentScheduler::new(transport, 2);

        let base = base_record();
        let out = scheduler
            .enrich_batch(vec![base.clone()], FetchMode::Lightweight)
            .await;
        assert_eq!(out[0], base);
    }

    #[tokio::test]
    async fn test_empty_detail_phone_does_not_erase_base() {
        let transport = Arc::new(DetailTransport {
            status: 200,
            body: r#"<html><body><div class="phone"></div></body></html>"#.to_string(),
        });
        let scheduler = EnrichmentScheduler::new(transport, 2);

        let out = scheduler
            .enrich_batch(vec![base_record()], FetchMode::Lightweight)
            .await;
        assert_eq!(out[0].phone.as_deref(), Some("555-0100"));
    }

    #[tokio::test]
    async fn test_records_with_detail_already_present_skip_fetch() {
        struct PanicTransport;

        #[async_trait]
        impl Transport for PanicTransport {
            async fn fetch(&self, _url: &str, _mode: FetchMode) -> Result<FetchResult> {
                Err(anyhow::anyhow!("should not be called"))
            }
        }

        let scheduler = EnrichmentScheduler::new(Arc::new(PanicTransport), 2);
        let mut record = base_record();
        record.biography = Some("already enriched".to_string());
        record.education = Some(vec!["School".to_string()]);
        record.bar_admissions = Some(vec!["Texas".to_string()]);

        let out = scheduler
            .enrich_batch(vec![record.clone()], FetchMode::Lightweight)
            .await;
        assert_eq!(out[0], record);
    }

    #[tokio::test]
    async fn test_output_preserves_admission_order() {
        let transport = Arc::new(DetailTransport {
            status: 200,
            body: "<html></html>".to_string(),
        });
        let scheduler = EnrichmentScheduler::new(transport, 4);

        let mut batch = Vec::new();
        for i in 0..8 {
            let mut record = LawyerRecord::new();
            record.set_name(&format!("Lawyer {i}"));
            record.profile_url =
                Some(format!("https://example.com/lawyers/tax/lawyer-{i}"));
            batch.push(record);
        }

        let out = scheduler.enrich_batch(batch, FetchMode::Lightweight).await;
        let names: Vec<String> = out.iter().map(|r| r.name.clone()).collect();
        let expected: Vec<String> = (0..8).map(|i| format!("Lawyer {i}")).collect();
        assert_eq!(names, expected);
    }
}
