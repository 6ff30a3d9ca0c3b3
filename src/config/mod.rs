//! Run configuration.
//!
//! A run is driven either by an explicit search URL or by a practice-area /
//! location pair that composes into the directory's listing-URL convention.
//! Missing both is a fatal configuration error, surfaced before any network
//! activity.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::utils::constants::{
    DEFAULT_PAGE_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_ATTEMPTS,
    ENRICH_CONCURRENCY,
};
use crate::utils::url_utils::slugify;

/// Errors surfaced to the binary with an exit-worthy cause.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Configuration for one scrape run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrapeConfig {
    /// Explicit listing URL. Takes precedence over the slug pair.
    pub search_url: Option<String>,
    /// Practice-area label, slugified into the listing path.
    pub practice_area: Option<String>,
    /// Location label, slugified into the listing path.
    pub location: Option<String>,
    /// Origin the slug pair composes against.
    pub base_url: String,

    /// Stop after this many records. 0 means unlimited.
    pub max_lawyers: usize,
    /// Stop after this many listing pages. 0 means unlimited.
    pub max_pages: usize,
    /// Fetch each admitted record's profile page for detail fields.
    pub fetch_full_profiles: bool,
    /// Persist zero-yield page snapshots.
    pub debug: bool,

    /// NDJSON output path.
    pub output_path: PathBuf,
    /// Where zero-yield snapshots land when `debug` is set.
    pub diagnostics_dir: PathBuf,

    pub request_timeout_secs: u64,
    pub retry_attempts: u32,
    /// Courtesy delay between listing pages.
    pub page_delay_ms: u64,
    pub enrich_concurrency: usize,
    pub headless: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            search_url: None,
            practice_area: None,
            location: None,
            base_url: "https://www.lawyers.com".to_string(),
            max_lawyers: 0,
            max_pages: 0,
            fetch_full_profiles: false,
            debug: false,
            output_path: PathBuf::from("lawyers.jsonl"),
            diagnostics_dir: PathBuf::from("diagnostics"),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            enrich_concurrency: ENRICH_CONCURRENCY,
            headless: true,
        }
    }
}

impl ScrapeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_practice_area(mut self, practice_area: impl Into<String>) -> Self {
        self.practice_area = Some(practice_area.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_max_lawyers(mut self, max: usize) -> Self {
        self.max_lawyers = max;
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = max;
        self
    }

    #[must_use]
    pub fn with_full_profiles(mut self, enabled: bool) -> Self {
        self.fetch_full_profiles = enabled;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// The listing URL this run starts from.
    ///
    /// An explicit `search_url` wins; otherwise both slugs must be present
    /// to compose one.
    pub fn listing_url(&self) -> Result<String, ScrapeError> {
        if let Some(url) = &self.search_url
            && !url.trim().is_empty()
        {
            return Ok(url.trim().to_string());
        }

        match (&self.practice_area, &self.location) {
            (Some(practice), Some(location))
                if !practice.trim().is_empty() && !location.trim().is_empty() =>
            {
                Ok(format!(
                    "{}/lawyers/{}/{}",
                    self.base_url.trim_end_matches('/'),
                    slugify(practice),
                    slugify(location)
                ))
            }
            _ => Err(ScrapeError::Config(
                "Either searchUrl or both practiceArea and location must be set".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_search_url_wins() {
        let config = ScrapeConfig::new()
            .with_search_url("https://www.lawyers.com/lawyers/tax-law/austin-texas?page=3")
            .with_practice_area("Family Law")
            .with_location("Dallas Texas");
        assert_eq!(
            config.listing_url().expect("valid config"),
            "https://www.lawyers.com/lawyers/tax-law/austin-texas?page=3"
        );
    }

    #[test]
    fn test_slug_pair_composes_listing_url() {
        let config = ScrapeConfig::new()
            .with_practice_area("Tax Law")
            .with_location("Austin, Texas");
        assert_eq!(
            config.listing_url().expect("valid config"),
            "https://www.lawyers.com/lawyers/tax-law/austin-texas"
        );
    }

    #[test]
    fn test_missing_both_is_fatal() {
        let config = ScrapeConfig::new();
        assert!(config.listing_url().is_err());
    }

    #[test]
    fn test_one_slug_alone_is_fatal() {
        let config = ScrapeConfig::new().with_practice_area("Tax Law");
        assert!(config.listing_url().is_err());
    }

    #[test]
    fn test_deserializes_from_json_with_defaults() {
        let config: ScrapeConfig = serde_json::from_str(
            r#"{"practiceArea": "Tax Law", "location": "Austin Texas", "maxLawyers": 25}"#,
        )
        .expect("valid config json");
        assert_eq!(config.max_lawyers, 25);
        assert_eq!(config.max_pages, 0);
        assert!(!config.fetch_full_profiles);
        assert_eq!(config.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
    }
}
