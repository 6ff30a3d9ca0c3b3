//! Generic record harvesting from unknown JSON shapes.
//!
//! The one primitive shared by every structured strategy that consumes
//! arbitrary JSON: a worklist depth-first traversal (explicit stack, visited
//! set keyed by container identity, so self-referential payloads cannot loop
//! or overflow) that looks for likely record arrays and maps their elements
//! through a data-driven field-alias table.

use std::collections::HashSet;

use serde_json::{Map, Value};
use url::Url;

use crate::records::{LawyerRecord, join_practice_areas};
use crate::utils::url_utils::absolutize;

/// Object keys whose array values likely hold one record per element.
/// `data` wrappers are unwrapped by the traversal itself.
const LIKELY_ARRAY_KEYS: [&str; 4] = ["lawyers", "attorneys", "results", "items"];

/// Ordered alias rules per logical field; first non-empty match wins.
const NAME_KEYS: [&str; 4] = ["name", "fullName", "full_name", "title"];
const FIRM_KEYS: [&str; 5] = ["firmName", "firm", "lawFirm", "organization", "company"];
const LOCATION_KEYS: [&str; 3] = ["location", "city", "cityState"];
const ADDRESS_KEYS: [&str; 3] = ["address", "fullAddress", "streetAddress"];
const PHONE_KEYS: [&str; 5] = ["phone", "telephone", "tel", "phoneNumber", "phone_number"];
const EMAIL_KEYS: [&str; 3] = ["email", "emailAddress", "mail"];
const URL_KEYS: [&str; 5] = ["profileUrl", "profileURL", "url", "link", "href"];
const PRACTICE_KEYS: [&str; 4] = [
    "practiceAreas",
    "practice_areas",
    "specialties",
    "areasOfPractice",
];
const DESCRIPTION_KEYS: [&str; 3] = ["description", "summary", "snippet"];
const YEARS_KEYS: [&str; 3] = ["yearsLicensed", "licensedSince", "yearsExperience"];
const BIO_KEYS: [&str; 3] = ["biography", "bio", "about"];
const EDUCATION_KEYS: [&str; 2] = ["education", "schools"];
const ADMISSION_KEYS: [&str; 3] = ["barAdmissions", "admissions", "jurisdictions"];
const LANGUAGE_KEYS: [&str; 2] = ["languages", "knowsLanguage"];

/// Walk an arbitrary JSON value and harvest every record it contains.
///
/// Elements lacking both a name and a resolvable profile URL are discarded.
#[must_use]
pub fn walk(root: &Value, page_url: &Url) -> Vec<LawyerRecord> {
    let mut records = Vec::new();
    let mut visited: HashSet<usize> = HashSet::new();
    let mut work: Vec<&Value> = vec![root];

    while let Some(node) = work.pop() {
        match node {
            Value::Object(map) => {
                if !visited.insert(container_id(node)) {
                    continue;
                }
                for key in LIKELY_ARRAY_KEYS {
                    if let Some(Value::Array(items)) = map.get(key) {
                        for item in items {
                            if let Value::Object(obj) = item
                                && let Some(record) = record_from_object(obj, page_url)
                            {
                                records.push(record);
                            }
                        }
                    }
                }
                // Reversed so pop order follows document order.
                work.extend(map.values().rev());
            }
            Value::Array(items) => {
                if !visited.insert(container_id(node)) {
                    continue;
                }
                work.extend(items.iter().rev());
            }
            _ => {}
        }
    }

    records
}

/// Map one JSON object through the alias table into a record.
///
/// Returns None when neither a name nor a profile URL could be resolved.
#[must_use]
pub fn record_from_object(obj: &Map<String, Value>, page_url: &Url) -> Option<LawyerRecord> {
    let mut record = LawyerRecord::new();

    if let Some(name) = string_alias(obj, &NAME_KEYS) {
        record.set_name(&name);
    }
    record.firm_name = string_alias(obj, &FIRM_KEYS);
    record.location = string_alias(obj, &LOCATION_KEYS);
    record.address = string_alias(obj, &ADDRESS_KEYS);
    record.phone = string_alias(obj, &PHONE_KEYS).or_else(|| contact_field(obj, &PHONE_KEYS));
    record.email = string_alias(obj, &EMAIL_KEYS).or_else(|| contact_field(obj, &EMAIL_KEYS));
    record.profile_url = string_alias(obj, &URL_KEYS)
        .and_then(|href| absolutize(&href, page_url))
        .map(|u| u.to_string());
    record.practice_areas = string_list_alias(obj, &PRACTICE_KEYS)
        .and_then(join_practice_areas);
    record.description = string_alias(obj, &DESCRIPTION_KEYS);
    record.years_licensed = string_alias(obj, &YEARS_KEYS);
    record.biography = string_alias(obj, &BIO_KEYS);
    record.education = string_list_alias(obj, &EDUCATION_KEYS).filter(|v| !v.is_empty());
    record.bar_admissions = string_list_alias(obj, &ADMISSION_KEYS).filter(|v| !v.is_empty());
    record.languages = string_list_alias(obj, &LANGUAGE_KEYS).filter(|v| !v.is_empty());

    (record.has_name() || record.profile_url.is_some()).then_some(record)
}

fn container_id(value: &Value) -> usize {
    std::ptr::from_ref(value) as usize
}

/// First alias key whose value is a non-empty string (numbers are accepted
/// and formatted, since sources disagree on e.g. year fields).
fn string_alias(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        match obj.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// Look the aliases up inside a nested `contact` object.
fn contact_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match obj.get("contact") {
        Some(Value::Object(contact)) => string_alias(contact, keys),
        _ => None,
    }
}

/// First alias key whose value yields a list of strings. Accepts a plain
/// string (split on commas), an array of strings, or an array of objects
/// carrying a `name`/`title`.
fn string_list_alias(obj: &Map<String, Value>, keys: &[&str]) -> Option<Vec<String>> {
    for key in keys {
        match obj.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => {
                return Some(
                    s.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
            }
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) if !s.trim().is_empty() => {
                            out.push(s.trim().to_string());
                        }
                        Value::Object(o) => {
                            if let Some(name) = string_alias(o, &["name", "title"]) {
                                out.push(name);
                            }
                        }
                        _ => {}
                    }
                }
                return Some(out);
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> Url {
        Url::parse("https://example.com/lawyers/tax/austin-tx").expect("valid test URL")
    }

    #[test]
    fn test_walk_finds_records_under_data_wrapper() {
        let payload = json!({
            "data": {
                "results": [
                    {
                        "fullName": "Jane Doe",
                        "firm": "Doe LLP",
                        "telephone": "512-555-0100",
                        "link": "/lawyers/tax/jane-doe",
                        "specialties": ["Tax", "Estate Planning", "Tax"]
                    },
                    { "irrelevant": true }
                ]
            }
        });

        let records = walk(&payload, &page());
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.firm_name.as_deref(), Some("Doe LLP"));
        assert_eq!(record.phone.as_deref(), Some("512-555-0100"));
        assert_eq!(
            record.profile_url.as_deref(),
            Some("https://example.com/lawyers/tax/jane-doe")
        );
        assert_eq!(record.practice_areas.as_deref(), Some("Tax, Estate Planning"));
    }

    #[test]
    fn test_walk_handles_deep_nesting_without_recursion() {
        let mut payload = json!({"lawyers": [{"name": "Deep One"}]});
        for _ in 0..2_000 {
            payload = json!({ "wrap": payload });
        }
        let records = walk(&payload, &page());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Deep One");
    }

    #[test]
    fn test_nested_contact_object() {
        let payload = json!({
            "attorneys": [
                {"name": "Jane Doe", "contact": {"phone": "555-0100", "email": "j@d.com"}}
            ]
        });
        let records = walk(&payload, &page());
        assert_eq!(records[0].phone.as_deref(), Some("555-0100"));
        assert_eq!(records[0].email.as_deref(), Some("j@d.com"));
    }

    #[test]
    fn test_elements_without_identity_are_discarded() {
        let payload = json!({
            "results": [
                {"firm": "Nameless LLP", "phone": "555-0100"}
            ]
        });
        assert!(walk(&payload, &page()).is_empty());
    }

    #[test]
    fn test_alias_priority_order() {
        let payload = json!({
            "items": [
                {"name": "Preferred", "fullName": "Ignored", "title": "Also Ignored"}
            ]
        });
        let records = walk(&payload, &page());
        assert_eq!(records[0].name, "Preferred");
    }
}
