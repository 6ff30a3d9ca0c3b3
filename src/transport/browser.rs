//! Rendered transport: headless Chrome via chromiumoxide.
//!
//! Launched lazily on the first rendered fetch and reused for the rest of
//! the run. Anti-bot evasion itself is the browser's concern; this module
//! only finds, launches, and drives it.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use tokio::task::{self, JoinHandle};

use super::{FetchMode, FetchResult};
use crate::utils::constants::CHROME_USER_AGENT;

/// Find a Chrome/Chromium executable on the system.
///
/// Checks the `CHROMIUM_PATH` environment variable first, then common
/// install locations, then `which`.
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    let paths: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for path_str in paths {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path_str.is_empty() {
                    let path = PathBuf::from(path_str);
                    info!("Found browser using 'which': {}", path.display());
                    return Ok(path);
                }
            }
        }
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium build if no system browser exists.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("lexscrape")
        .join("chromium");
    std::fs::create_dir_all(&cache_dir).context("Failed to create browser cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );

    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;
    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );

    Ok(revision_info.executable_path)
}

/// Launch a browser with stealth-oriented arguments and spawn the handler
/// task that drives the CDP connection.
async fn launch_browser(headless: bool) -> Result<(Browser, JoinHandle<()>)> {
    let chrome_path = match find_browser_executable() {
        Ok(path) => path,
        Err(_) => download_managed_browser().await?,
    };

    let user_data_dir =
        std::env::temp_dir().join(format!("lexscrape_chrome_{}", std::process::id()));
    std::fs::create_dir_all(&user_data_dir).context("Failed to create user data directory")?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir)
        .chrome_executable(chrome_path);

    if headless {
        config_builder = config_builder.headless_mode(HeadlessMode::default());
    } else {
        config_builder = config_builder.with_head();
    }

    config_builder = config_builder
        .arg(format!("--user-agent={CHROME_USER_AGENT}"))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-background-networking")
        .arg("--disable-breakpad")
        .arg("--disable-hang-monitor")
        .arg("--disable-popup-blocking")
        .arg("--disable-prompt-on-repost")
        .arg("--metrics-recording-only")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!("Launching browser for rendered fetching");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(h) = handler.next().await {
            if let Err(e) = h {
                let msg = e.to_string();
                // Chrome emits CDP events chromiumoxide can't deserialize; those
                // are noise, not failures.
                let benign = msg.contains("data did not match any variant of untagged enum Message")
                    || msg.contains("Failed to deserialize WS response");
                if !benign {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        debug!("Browser handler task completed");
    });

    Ok((browser, handler_task))
}

struct BrowserHandle {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

/// Rendered fetch path. Holds at most one browser per run.
pub struct BrowserRenderer {
    handle: Mutex<Option<BrowserHandle>>,
    headless: bool,
    page_timeout_secs: u64,
}

impl BrowserRenderer {
    #[must_use]
    pub fn new(headless: bool, page_timeout_secs: u64) -> Self {
        Self {
            handle: Mutex::new(None),
            headless,
            page_timeout_secs,
        }
    }

    /// Navigate to a URL in a fresh tab and return the rendered markup.
    ///
    /// CDP navigation does not reliably surface the HTTP status of the main
    /// document, so the result reports 200 and blocking detection falls back
    /// to body-phrase scanning for rendered fetches.
    ///
    /// # Errors
    /// Returns an error if the browser cannot be launched or the page fails
    /// to load within the timeout.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult> {
        let mut guard = self.handle.lock().await;
        if guard.is_none() {
            let (browser, handler_task) = launch_browser(self.headless).await?;
            *guard = Some(BrowserHandle {
                browser,
                handler_task,
            });
        }
        let handle = guard
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Browser handle missing after launch"))?;

        let page = handle
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to open page")?;

        let timeout = Duration::from_secs(self.page_timeout_secs);
        let navigation = async {
            page.goto(url)
                .await
                .map_err(|e| anyhow::anyhow!("Navigation failed: {e}"))?;
            page.wait_for_navigation()
                .await
                .map_err(|e| anyhow::anyhow!("Page load failed: {e}"))?;
            Ok::<(), anyhow::Error>(())
        };
        match tokio::time::timeout(timeout, navigation).await {
            Ok(result) => result?,
            Err(_) => {
                let _ = page.close().await;
                return Err(anyhow::anyhow!(
                    "Rendered fetch timeout after {}s for {url}",
                    self.page_timeout_secs
                ));
            }
        }

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());
        let body = page.content().await.context("Failed to read page content")?;

        if let Err(e) = page.close().await {
            debug!("Failed to close page for {url}: {e}");
        }

        Ok(FetchResult {
            url: url.to_string(),
            final_url,
            status_code: 200,
            body,
            mode: FetchMode::Rendered,
        })
    }

    /// Close the browser if one was launched.
    pub async fn shutdown(&self) {
        let mut guard = self.handle.lock().await;
        if let Some(mut handle) = guard.take() {
            if let Err(e) = handle.browser.close().await {
                warn!("Failed to close browser: {e}");
            }
            handle.handler_task.abort();
            if let Err(e) = handle.handler_task.await
                && !e.is_cancelled()
            {
                warn!("Browser handler task failed during abort: {e}");
            }
        }
    }
}
