//! Anti-bot challenge detection.
//!
//! Classifies a fetch result as blocked or usable from the HTTP status and a
//! bounded, case-insensitive scan of the body prefix. Pure function, no
//! full-body parsing.

use log::debug;

use crate::transport::FetchResult;
use crate::utils::constants::BLOCK_SCAN_PREFIX_BYTES;

/// Statuses that signal rate limiting or access denial.
const BLOCKED_STATUSES: [u16; 3] = [403, 429, 503];

/// Phrases that interstitial challenge pages announce themselves with.
/// Matched against the lowercased body prefix.
const CHALLENGE_PHRASES: [&str; 7] = [
    "checking your browser",
    "verify you are human",
    "access denied",
    "just a moment",
    "cf-challenge",
    "attention required",
    "captcha",
];

/// Classification of one fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockVerdict {
    pub blocked: bool,
}

/// Classify a fetch result as blocked or usable.
#[must_use]
pub fn classify(result: &FetchResult) -> BlockVerdict {
    if BLOCKED_STATUSES.contains(&result.status_code) {
        debug!("Blocked by status {} for {}", result.status_code, result.url);
        return BlockVerdict { blocked: true };
    }

    // Back the cut point off to a char boundary so the slice cannot panic
    // on multi-byte content.
    let limit = result.body.len().min(BLOCK_SCAN_PREFIX_BYTES);
    let prefix_end = (0..=limit)
        .rev()
        .find(|&i| result.body.is_char_boundary(i))
        .unwrap_or(0);
    let prefix = result.body[..prefix_end].to_lowercase();

    for phrase in CHALLENGE_PHRASES {
        if prefix.contains(phrase) {
            debug!("Blocked by challenge phrase {phrase:?} for {}", result.url);
            return BlockVerdict { blocked: true };
        }
    }

    BlockVerdict { blocked: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FetchMode;

    fn result(status: u16, body: &str) -> FetchResult {
        FetchResult {
            url: "https://example.com/lawyers/tax/austin-tx".to_string(),
            final_url: "https://example.com/lawyers/tax/austin-tx".to_string(),
            status_code: status,
            body: body.to_string(),
            mode: FetchMode::Lightweight,
        }
    }

    #[test]
    fn test_blocked_statuses() {
        for status in [403, 429, 503] {
            assert!(classify(&result(status, "<html></html>")).blocked);
        }
        for status in [200, 301, 404, 500] {
            assert!(!classify(&result(status, "<html></html>")).blocked);
        }
    }

    #[test]
    fn test_challenge_phrase_is_case_insensitive() {
        let verdict = classify(&result(200, "<html><title>Checking Your Browser</title></html>"));
        assert!(verdict.blocked);
    }

    #[test]
    fn test_phrase_beyond_prefix_is_ignored() {
        let mut body = "x".repeat(BLOCK_SCAN_PREFIX_BYTES + 100);
        body.push_str("verify you are human");
        assert!(!classify(&result(200, &body)).blocked);
    }

    #[test]
    fn test_clean_page_passes() {
        let verdict = classify(&result(200, "<html><body>Jane Doe, Attorney</body></html>"));
        assert!(!verdict.blocked);
    }

    #[test]
    fn test_multibyte_prefix_does_not_panic() {
        let body = "é".repeat(BLOCK_SCAN_PREFIX_BYTES);
        assert!(!classify(&result(200, &body)).blocked);
    }
}
