//! Shared configuration constants for lexscrape
//!
//! This module contains default values and tuning constants used throughout
//! the codebase to ensure consistency and avoid magic numbers.

/// Default per-request timeout for the lightweight HTTP transport.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of fetch attempts before a page is abandoned.
///
/// Applies only to transport-level failures (connect errors, timeouts,
/// unexpected 5xx). Blocked responses are never retried here; they are
/// returned to the caller so the escalation controller can switch modes.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Delay between lightweight retry attempts, multiplied by the attempt number.
pub const RETRY_BACKOFF_MS: u64 = 500;

/// Default pause between listing pages.
///
/// Conservative pacing that keeps the harvester from hammering the
/// directory. Detail-page fetches are paced by the enrichment
/// concurrency ceiling instead.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 1_000;

/// Maximum detail-page fetches in flight during enrichment.
pub const ENRICH_CONCURRENCY: usize = 4;

/// How many leading bytes of a response body the blocking detector scans.
///
/// Challenge interstitials announce themselves in the first few KB;
/// scanning further only costs time on large legitimate pages.
pub const BLOCK_SCAN_PREFIX_BYTES: usize = 4_096;

/// How many leading bytes of markup a zero-yield diagnostic snapshot keeps.
pub const SNAPSHOT_EXCERPT_BYTES: usize = 2_048;

/// Name recorded when no extractor could resolve one.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Path prefix that identifies a profile link on the directory.
pub const PROFILE_PATH_PREFIX: &str = "/lawyers/";

/// Chrome user agent string shared by both transports.
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
/// Next update: 2025-04-29 (quarterly schedule)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
