//! Next-listing-page resolution across heterogeneous pagination markup.
//!
//! Four rules tried in order: an explicit next relation, a next-text anchor,
//! a next-labeled anchor, and finally numeric current/sibling matching inside
//! a recognized pagination container. `None` signals normal termination.

use log::debug;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::utils::url_utils::absolutize;

/// Visible anchor texts accepted as a "next" control.
const NEXT_TOKENS: [&str; 6] = ["next", "next page", "next »", "next ›", "›", "»"];

/// Containers recognized as pagination blocks for the numeric rule.
const PAGINATION_CONTAINERS: [&str; 4] = [
    ".pagination",
    ".pager",
    "ul.page-numbers",
    "nav.pagination-nav",
];

/// Classes/attributes that mark the current page inside a container.
const CURRENT_MARKERS: [&str; 3] = [".current", ".active", "[aria-current]"];

/// Resolve the next listing-page URL from the current page's markup.
///
/// Returns `None` when no rule matches, which ends the page loop.
#[must_use]
pub fn next_url(markup: &str, page_url: &Url) -> Option<Url> {
    let document = Html::parse_document(markup);

    if let Some(url) = rel_next(&document, page_url) {
        debug!("Pagination via rel=next: {url}");
        return Some(url);
    }
    if let Some(url) = next_text_anchor(&document, page_url) {
        debug!("Pagination via next-text anchor: {url}");
        return Some(url);
    }
    if let Some(url) = next_label_anchor(&document, page_url) {
        debug!("Pagination via aria-label: {url}");
        return Some(url);
    }
    if let Some(url) = numeric_sibling(&document, page_url) {
        debug!("Pagination via numeric sibling: {url}");
        return Some(url);
    }

    None
}

fn accept(href: &str, page_url: &Url) -> Option<Url> {
    let resolved = absolutize(href, page_url)?;
    // A "next" link pointing back at the current page would loop forever.
    (resolved != *page_url).then_some(resolved)
}

fn rel_next(document: &Html, page_url: &Url) -> Option<Url> {
    let selector = Selector::parse(r#"a[rel~="next"], link[rel~="next"]"#).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .find_map(|href| accept(href, page_url))
}

fn next_text_anchor(document: &Html, page_url: &Url) -> Option<Url> {
    let selector = Selector::parse("a[href]").ok()?;
    for anchor in document.select(&selector) {
        let text = anchor.text().collect::<String>();
        let text = text.trim().to_lowercase();
        if NEXT_TOKENS.contains(&text.as_str())
            && let Some(href) = anchor.value().attr("href")
            && let Some(url) = accept(href, page_url)
        {
            return Some(url);
        }
    }
    None
}

fn next_label_anchor(document: &Html, page_url: &Url) -> Option<Url> {
    let selector = Selector::parse("a[href][aria-label]").ok()?;
    for anchor in document.select(&selector) {
        let label = anchor.value().attr("aria-label").unwrap_or_default();
        if label.to_lowercase().contains("next")
            && let Some(href) = anchor.value().attr("href")
            && let Some(url) = accept(href, page_url)
        {
            return Some(url);
        }
    }
    None
}

/// Within a recognized pagination container, parse the current page number N
/// and return the sibling anchor whose text parses to exactly N + 1.
fn numeric_sibling(document: &Html, page_url: &Url) -> Option<Url> {
    for container_sel in PAGINATION_CONTAINERS {
        let Ok(selector) = Selector::parse(container_sel) else {
            continue;
        };
        for container in document.select(&selector) {
            let Some(current) = current_page_number(&container) else {
                continue;
            };
            // Overflow only disqualifies this container, not the rest.
            let Some(target) = current.checked_add(1) else {
                continue;
            };

            let Ok(anchor_sel) = Selector::parse("a[href]") else {
                continue;
            };
            for anchor in container.select(&anchor_sel) {
                let text = anchor.text().collect::<String>();
                if text.trim().parse::<u64>() == Ok(target)
                    && let Some(href) = anchor.value().attr("href")
                    && let Some(url) = accept(href, page_url)
                {
                    return Some(url);
                }
            }
        }
    }
    None
}

fn current_page_number(container: &ElementRef<'_>) -> Option<u64> {
    for marker in CURRENT_MARKERS {
        let Ok(selector) = Selector::parse(marker) else {
            continue;
        };
        for marked in container.select(&selector) {
            let text = marked.text().collect::<String>();
            if let Ok(n) = text.trim().parse::<u64>() {
                return Some(n);
            }
        }
    }
    None
}
