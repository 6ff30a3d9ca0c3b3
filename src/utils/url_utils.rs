//! URL manipulation helpers.
//!
//! Absolutization, origin checks, and the profile-path convention used to
//! tell directory profile links apart from category and navigation links.

use url::Url;

use super::constants::PROFILE_PATH_PREFIX;

/// Resolve a possibly-relative href against the page it appeared on.
///
/// Returns None for empty hrefs, non-http(s) schemes, and unparseable input.
#[must_use]
pub fn absolutize(href: &str, page_url: &Url) -> Option<Url> {
    let trimmed = href.trim();
    if trimmed.is_empty()
        || trimmed.starts_with("javascript:")
        || trimmed.starts_with("mailto:")
        || trimmed.starts_with("data:")
        || trimmed.starts_with('#')
    {
        return None;
    }

    let resolved = page_url.join(trimmed).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}

/// Check whether two URLs share scheme, host, and port.
#[must_use]
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

/// Check whether a URL path follows the directory's profile-link convention:
/// the `/lawyers/` prefix with at least two non-empty path segments.
///
/// One segment (`/lawyers/criminal-law`) is a category listing; a profile
/// always carries at least a category and a person slug.
#[must_use]
pub fn is_profile_path(url: &Url) -> bool {
    let path = url.path();
    if !path.starts_with(PROFILE_PATH_PREFIX) {
        return false;
    }

    let segments = path
        .trim_start_matches('/')
        .split('/')
        .skip(1) // the "lawyers" segment itself
        .filter(|s| !s.is_empty())
        .count();
    segments >= 2
}

/// Lowercase a human-entered slug component: spaces and underscores become
/// dashes, everything non-alphanumeric besides dashes is dropped.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for ch in input.trim().chars() {
        match ch {
            ' ' | '_' | '-' => {
                if !slug.ends_with('-') {
                    slug.push('-');
                }
            }
            c if c.is_ascii_alphanumeric() => slug.push(c.to_ascii_lowercase()),
            _ => {}
        }
    }
    slug.trim_matches('-').to_string()
}

/// Strip a `tel:` scheme and surrounding whitespace from a phone href.
#[must_use]
pub fn clean_tel_href(href: &str) -> String {
    href.trim()
        .trim_start_matches("tel:")
        .trim()
        .to_string()
}

/// Strip a `mailto:` scheme and any query suffix from an email href.
#[must_use]
pub fn clean_mailto_href(href: &str) -> String {
    let stripped = href.trim().trim_start_matches("mailto:");
    stripped
        .split('?')
        .next()
        .unwrap_or(stripped)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://example.com/lawyers/family-law/austin-tx").expect("valid test URL")
    }

    #[test]
    fn test_absolutize_relative() {
        let url = absolutize("/lawyers/tax/jane-doe", &page()).expect("should resolve");
        assert_eq!(url.as_str(), "https://example.com/lawyers/tax/jane-doe");
    }

    #[test]
    fn test_absolutize_rejects_non_http() {
        assert!(absolutize("javascript:void(0)", &page()).is_none());
        assert!(absolutize("mailto:a@b.com", &page()).is_none());
        assert!(absolutize("", &page()).is_none());
        assert!(absolutize("#top", &page()).is_none());
    }

    #[test]
    fn test_profile_path_requires_two_segments() {
        let profile = Url::parse("https://example.com/lawyers/tax/jane-doe").expect("valid");
        let category = Url::parse("https://example.com/lawyers/tax").expect("valid");
        let category_trailing = Url::parse("https://example.com/lawyers/tax/").expect("valid");
        let unrelated = Url::parse("https://example.com/about/team/jane").expect("valid");

        assert!(is_profile_path(&profile));
        assert!(!is_profile_path(&category));
        assert!(!is_profile_path(&category_trailing));
        assert!(!is_profile_path(&unrelated));
    }

    #[test]
    fn test_same_origin() {
        let a = Url::parse("https://example.com/a").expect("valid");
        let b = Url::parse("https://example.com:443/b").expect("valid");
        let c = Url::parse("https://other.com/a").expect("valid");
        assert!(same_origin(&a, &b));
        assert!(!same_origin(&a, &c));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Family Law"), "family-law");
        assert_eq!(slugify("  Austin, TX "), "austin-tx");
        assert_eq!(slugify("real_estate"), "real-estate");
    }

    #[test]
    fn test_contact_href_cleaning() {
        assert_eq!(clean_tel_href("tel:+1-512-555-0100"), "+1-512-555-0100");
        assert_eq!(clean_mailto_href("mailto:jane@firm.com?subject=hi"), "jane@firm.com");
    }
}
