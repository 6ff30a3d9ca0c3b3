use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use lexscrape::config::ScrapeConfig;
use lexscrape::scrape_engine::ScrapeRunner;
use lexscrape::sink::JsonlSink;
use lexscrape::transport::NetTransport;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = load_config()?;
    let listing_url = config.listing_url()?;
    info!("Scraping {listing_url} into {}", config.output_path.display());

    let transport = Arc::new(NetTransport::new(
        config.request_timeout_secs,
        config.retry_attempts,
        config.headless,
    )?);
    let sink = Arc::new(JsonlSink::new(config.output_path.clone()));

    let mut runner = ScrapeRunner::new(
        config,
        Arc::clone(&transport) as Arc<dyn lexscrape::Transport>,
        sink,
    );
    let stats = runner.run().await;
    transport.shutdown().await;
    let stats = stats?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Config comes from a JSON file named on the command line, or defaults
/// plus environment-style overrides are left to the caller's file.
fn load_config() -> Result<ScrapeConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {path}"))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {path}"))
        }
        None => anyhow::bail!(
            "Usage: lexscrape <config.json>\n\
             The config file must set searchUrl, or practiceArea and location."
        ),
    }
}
