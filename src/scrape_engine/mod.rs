//! The scraping pipeline: detection, dedup, enrichment, escalation,
//! pagination, and the run controller that ties them together.

pub mod blocking;
pub mod dedup;
pub mod enrich;
pub mod escalation;
pub mod pagination;
pub mod runner;
pub mod stats;

pub use blocking::{BlockVerdict, classify};
pub use dedup::DedupLedger;
pub use enrich::EnrichmentScheduler;
pub use escalation::EscalationState;
pub use runner::ScrapeRunner;
pub use stats::{PageStrategy, RunStats};
