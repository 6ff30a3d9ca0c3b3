//! Directory record schema and identity semantics.
//!
//! `LawyerRecord` is the one shape every extraction strategy produces and the
//! sink consumes. Optional fields are nullable but always present in the
//! serialized output so downstream consumers get a stable schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::constants::UNKNOWN_NAME;

/// A single directory entry.
///
/// Created by an extractor, filtered through the dedup ledger, optionally
/// enriched from the detail page, then handed to the sink. The pipeline
/// never mutates a record after handing it off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawyerRecord {
    /// Display name; defaults to a sentinel when no source resolved one.
    pub name: String,
    pub firm_name: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Absolute profile URL; primary identity when present.
    #[serde(rename = "profileURL")]
    pub profile_url: Option<String>,
    /// Comma-joined, order-preserving, deduplicated list.
    pub practice_areas: Option<String>,
    pub description: Option<String>,
    pub years_licensed: Option<String>,
    pub biography: Option<String>,
    pub education: Option<Vec<String>>,
    pub bar_admissions: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub scraped_at: DateTime<Utc>,
}

impl LawyerRecord {
    /// Create an empty record with the sentinel name and a fresh timestamp.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: UNKNOWN_NAME.to_string(),
            firm_name: None,
            location: None,
            address: None,
            phone: None,
            email: None,
            profile_url: None,
            practice_areas: None,
            description: None,
            years_licensed: None,
            biography: None,
            education: None,
            bar_admissions: None,
            languages: None,
            scraped_at: Utc::now(),
        }
    }

    /// Set the name unless the candidate value is blank.
    pub fn set_name(&mut self, name: &str) {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            self.name = trimmed.to_string();
        }
    }

    /// Whether a usable name was ever resolved.
    #[must_use]
    pub fn has_name(&self) -> bool {
        self.name != UNKNOWN_NAME && !self.name.trim().is_empty()
    }

    /// The value used to decide whether two records refer to the same entity.
    ///
    /// Profile URL when non-empty, otherwise a composite of name, location,
    /// and firm. Compared exactly: no case folding, no normalization.
    #[must_use]
    pub fn identity_key(&self) -> String {
        match self.profile_url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!(
                "{}|{}|{}",
                self.name,
                self.location.as_deref().unwrap_or(""),
                self.firm_name.as_deref().unwrap_or(""),
            ),
        }
    }

    /// Whether this record still lacks the fields only a detail page provides.
    #[must_use]
    pub fn needs_detail(&self) -> bool {
        self.biography.is_none() && self.education.is_none() && self.bar_admissions.is_none()
    }

    /// Overlay every non-empty field of `detail` onto this record.
    ///
    /// Empty or absent detail values never erase an existing base value.
    /// Enrichment applies overlays in ascending precedence, so the last
    /// overlay applied wins where both carry a value.
    pub fn merge_detail(&mut self, detail: &LawyerRecord) {
        if detail.has_name() {
            self.name = detail.name.clone();
        }
        merge_opt(&mut self.firm_name, detail.firm_name.as_deref());
        merge_opt(&mut self.location, detail.location.as_deref());
        merge_opt(&mut self.address, detail.address.as_deref());
        merge_opt(&mut self.phone, detail.phone.as_deref());
        merge_opt(&mut self.email, detail.email.as_deref());
        merge_opt(&mut self.profile_url, detail.profile_url.as_deref());
        merge_opt(&mut self.practice_areas, detail.practice_areas.as_deref());
        merge_opt(&mut self.description, detail.description.as_deref());
        merge_opt(&mut self.years_licensed, detail.years_licensed.as_deref());
        merge_opt(&mut self.biography, detail.biography.as_deref());
        merge_list(&mut self.education, detail.education.as_deref());
        merge_list(&mut self.bar_admissions, detail.bar_admissions.as_deref());
        merge_list(&mut self.languages, detail.languages.as_deref());
    }
}

impl Default for LawyerRecord {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_opt(base: &mut Option<String>, detail: Option<&str>) {
    if let Some(value) = detail {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            *base = Some(trimmed.to_string());
        }
    }
}

fn merge_list(base: &mut Option<Vec<String>>, detail: Option<&[String]>) {
    if let Some(values) = detail
        && !values.is_empty()
    {
        *base = Some(values.to_vec());
    }
}

/// Join practice-area names into the canonical comma-separated form,
/// preserving order and dropping exact duplicates.
#[must_use]
pub fn join_practice_areas<I, S>(areas: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<String> = Vec::new();
    for area in areas {
        let trimmed = area.as_ref().trim();
        if !trimmed.is_empty() && !seen.iter().any(|s| s == trimmed) {
            seen.push(trimmed.to_string());
        }
    }
    if seen.is_empty() {
        None
    } else {
        Some(seen.join(", "))
    }
}
