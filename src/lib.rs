//! Resilient extraction pipeline for attorney-directory listings.
//!
//! The target directory serves the same listings through whatever happens
//! to be deployed that week: a JSON search API, JSON-LD annotations,
//! framework state blobs, embedded JSON, or plain server-rendered HTML,
//! with anti-bot interstitials in front of any of them. This crate runs a
//! fixed cascade of extraction strategies over each listing page, dedups
//! and optionally enriches the records it finds, and escalates one way
//! from plain HTTP to a rendered browser when it gets blocked.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lexscrape::config::ScrapeConfig;
//! use lexscrape::scrape_engine::ScrapeRunner;
//! use lexscrape::sink::JsonlSink;
//! use lexscrape::transport::NetTransport;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ScrapeConfig::new()
//!     .with_practice_area("Tax Law")
//!     .with_location("Austin, Texas")
//!     .with_max_lawyers(50);
//!
//! let transport = Arc::new(NetTransport::new(
//!     config.request_timeout_secs,
//!     config.retry_attempts,
//!     config.headless,
//! )?);
//! let sink = Arc::new(JsonlSink::new(config.output_path.clone()));
//!
//! let mut runner = ScrapeRunner::new(config, transport.clone(), sink);
//! let stats = runner.run().await?;
//! transport.shutdown().await;
//! println!("{}", serde_json::to_string_pretty(&stats)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod extractors;
pub mod records;
pub mod scrape_engine;
pub mod sink;
pub mod transport;
pub mod utils;

pub use config::{ScrapeConfig, ScrapeError};
pub use records::LawyerRecord;
pub use scrape_engine::{RunStats, ScrapeRunner};
pub use sink::{JsonlSink, MemorySink, RecordSink};
pub use transport::{FetchMode, FetchResult, NetTransport, Transport};
