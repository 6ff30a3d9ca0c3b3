//! Heuristic HTML strategy, the cascade's last resort.
//!
//! Selects anchors that follow the profile-link convention, walks outward to
//! the nearest recognizable listing container, and pulls sibling fields
//! through ordered selector fallback lists. Least precise and most
//! expensive to tune, so it only runs when every structured strategy
//! came up empty.

use std::sync::LazyLock;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::{Extractor, page_url};
use crate::records::{LawyerRecord, join_practice_areas};
use crate::transport::FetchResult;
use crate::utils::url_utils::{absolutize, clean_mailto_href, clean_tel_href, is_profile_path};

/// Class fragments that mark a listing container.
const CONTAINER_CLASS_HINTS: [&str; 7] = [
    "lawyer", "attorney", "result", "card", "listing", "profile", "serp",
];

/// Tags accepted as containers even without a class hint.
const STRUCTURAL_TAGS: [&str; 3] = ["li", "article", "tr"];

struct FieldSelectors {
    anchors: Selector,
    name: Vec<Selector>,
    firm: Vec<Selector>,
    location: Vec<Selector>,
    phone_links: Selector,
    phone: Vec<Selector>,
    email_links: Selector,
    practice: Vec<Selector>,
    description: Vec<Selector>,
}

fn parse_all(sources: &[&str]) -> Vec<Selector> {
    sources
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}

/// Compiled once; the fallback lists are fixed.
static SELECTORS: LazyLock<FieldSelectors> = LazyLock::new(|| FieldSelectors {
    anchors: Selector::parse("a[href]").expect("anchor selector is valid"),
    name: parse_all(&[
        ".lawyer-name",
        ".attorney-name",
        r#"[class*="name"]"#,
        "h2",
        "h3",
    ]),
    firm: parse_all(&[".firm-name", ".law-firm", r#"[class*="firm"]"#]),
    location: parse_all(&[
        ".location",
        ".locality",
        r#"[class*="location"]"#,
        ".address",
    ]),
    phone_links: Selector::parse(r#"a[href^="tel:"]"#).expect("tel selector is valid"),
    phone: parse_all(&[".phone", r#"[class*="phone"]"#]),
    email_links: Selector::parse(r#"a[href^="mailto:"]"#).expect("mailto selector is valid"),
    practice: parse_all(&[
        ".practice-areas li",
        ".practice-area",
        r#"[class*="practice"] li"#,
        ".chip",
    ]),
    description: parse_all(&[".description", ".snippet", r#"[class*="description"]"#]),
});

pub struct HtmlFallbackExtractor;

impl HtmlFallbackExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlFallbackExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for HtmlFallbackExtractor {
    fn name(&self) -> &'static str {
        "html-fallback"
    }

    async fn extract(&self, page: &FetchResult) -> Vec<LawyerRecord> {
        let Some(base) = page_url(page) else {
            return Vec::new();
        };

        let document = Html::parse_document(&page.body);
        let mut records = Vec::new();
        let mut seen_urls: Vec<String> = Vec::new();

        for anchor in document.select(&SELECTORS.anchors) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(resolved) = absolutize(href, &base) else {
                continue;
            };
            if !is_profile_path(&resolved) {
                continue;
            }
            let profile_url = resolved.to_string();
            if seen_urls.contains(&profile_url) {
                continue;
            }
            seen_urls.push(profile_url.clone());

            let mut record = LawyerRecord::new();
            record.profile_url = Some(profile_url);

            let anchor_text = collapse_whitespace(&anchor.text().collect::<String>());
            if !anchor_text.is_empty() {
                record.set_name(&anchor_text);
            }

            if let Some(container) = enclosing_container(anchor) {
                if !record.has_name()
                    && let Some(name) = first_text(&container, &SELECTORS.name)
                {
                    record.set_name(&name);
                }
                record.firm_name = first_text(&container, &SELECTORS.firm);
                record.location = first_text(&container, &SELECTORS.location);
                record.phone = phone_from(&container);
                record.email = email_from(&container);
                record.practice_areas = practice_areas_from(&container);
                record.description = first_text(&container, &SELECTORS.description);
            }

            records.push(record);
        }

        records
    }
}

/// Walk outward from the anchor to the nearest element matching the fixed
/// container patterns. Stops at body.
fn enclosing_container<'a>(anchor: ElementRef<'a>) -> Option<ElementRef<'a>> {
    for node in anchor.ancestors() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        let tag = element.value().name();
        if tag == "body" || tag == "html" {
            break;
        }

        let class_hit = element.value().classes().any(|class| {
            let lowered = class.to_lowercase();
            CONTAINER_CLASS_HINTS
                .iter()
                .any(|hint| lowered.contains(hint))
        });
        if class_hit || STRUCTURAL_TAGS.contains(&tag) {
            return Some(element);
        }
    }
    None
}

/// First selector in the list yielding a non-empty text, in order.
fn first_text(scope: &ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    for selector in selectors {
        for element in scope.select(selector) {
            let text = collapse_whitespace(&element.text().collect::<String>());
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn phone_from(scope: &ElementRef<'_>) -> Option<String> {
    if let Some(link) = scope.select(&SELECTORS.phone_links).next()
        && let Some(href) = link.value().attr("href")
    {
        let phone = clean_tel_href(href);
        if !phone.is_empty() {
            return Some(phone);
        }
    }
    first_text(scope, &SELECTORS.phone)
}

fn email_from(scope: &ElementRef<'_>) -> Option<String> {
    let link = scope.select(&SELECTORS.email_links).next()?;
    let href = link.value().attr("href")?;
    let email = clean_mailto_href(href);
    (!email.is_empty()).then_some(email)
}

fn practice_areas_from(scope: &ElementRef<'_>) -> Option<String> {
    for selector in &SELECTORS.practice {
        let chips: Vec<String> = scope
            .select(selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .collect();
        if !chips.is_empty() {
            return join_practice_areas(chips);
        }
    }
    None
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
