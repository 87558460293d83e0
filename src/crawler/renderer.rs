//! Headless browser rendering
//!
//! Each rendered fetch launches its own browser, renders one page and tears
//! the browser down again. `BrowserSession` owns the browser process and its
//! CDP handler task: `close` shuts it down on the normal paths, and dropping
//! the session (for instance when the crawl timeout cancels the fetch) kills
//! the process and stops the handler.

use crate::config::BrowserConfig;
use crate::crawler::fetcher::{FetchError, Fetcher};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Headless browser strategy
#[derive(Debug, Clone)]
pub struct RenderedFetcher {
    config: BrowserConfig,
    user_agent: String,
}

impl RenderedFetcher {
    pub fn new(config: BrowserConfig, user_agent: impl Into<String>) -> Self {
        Self {
            config,
            user_agent: user_agent.into(),
        }
    }

    /// Opens a tab, navigates and reads the rendered HTML
    async fn render(
        &self,
        session: &BrowserSession,
        url: &Url,
        settle_delay: Duration,
    ) -> Result<String, FetchError> {
        let page = session
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| navigation_error(url, e))?;

        page.set_user_agent(self.user_agent.as_str())
            .await
            .map_err(|e| navigation_error(url, e))?;

        let navigation_timeout = Duration::from_millis(self.config.navigation_timeout_ms);
        let status = tokio::time::timeout(navigation_timeout, navigate(&page, url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| navigation_error(url, e))?;
        check_status(url, status)?;

        // Let deferred client-side rendering finish
        if !settle_delay.is_zero() {
            tokio::time::sleep(settle_delay).await;
        }

        page.content().await.map_err(|e| navigation_error(url, e))
    }
}

#[async_trait]
impl Fetcher for RenderedFetcher {
    async fn fetch(&self, url: &Url, settle_delay: Duration) -> Result<String, FetchError> {
        let session = BrowserSession::launch(&self.config).await?;
        tracing::debug!("Browser launched for {}", url);

        let result = self.render(&session, url, settle_delay).await;
        session.close().await;

        result
    }
}

/// Navigates and waits for the main document's response
///
/// Waits for the load event rather than network idle; late client-side
/// rendering is covered by the settle delay that follows.
///
/// # Returns
///
/// * `Ok(Some(status))` - HTTP status of the main document
/// * `Ok(None)` - The browser reported no response (e.g. served from cache)
/// * `Err(CdpError)` - Network-level navigation failure
async fn navigate(page: &Page, url: &Url) -> Result<Option<u16>, chromiumoxide::error::CdpError> {
    page.goto(url.as_str()).await?;
    let request = page.wait_for_navigation_response().await?;

    Ok(request
        .as_ref()
        .and_then(|request| request.response.as_ref())
        .and_then(|response| u16::try_from(response.status).ok()))
}

/// Rejects a rendered page whose main document was not a 2xx
///
/// Chrome renders error responses like any other page, so the status has to
/// be checked explicitly.
fn check_status(url: &Url, status: Option<u16>) -> Result<(), FetchError> {
    match status {
        Some(status) if !(200..300).contains(&status) => Err(FetchError::Status {
            url: url.to_string(),
            status,
        }),
        _ => Ok(()),
    }
}

fn navigation_error(url: &Url, e: chromiumoxide::error::CdpError) -> FetchError {
    FetchError::Navigation {
        url: url.to_string(),
        message: e.to_string(),
    }
}

/// A browser process scoped to one fetch
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    async fn launch(config: &BrowserConfig) -> Result<Self, FetchError> {
        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Viewport::default()
            });

        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }

        let chrome_config = builder.build().map_err(FetchError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| FetchError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(Self { browser, handler })
    }

    /// Closes the browser and waits for the process to exit
    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close error: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser wait error: {}", e);
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // The browser's own drop kills the process if it is still running
        self.handler.abort();
    }
}
