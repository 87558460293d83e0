//! Page fetching
//!
//! This module handles turning a URL into HTML, including:
//! - The `Fetcher` capability shared by the static and rendered strategies
//! - Building HTTP clients that present themselves as a desktop browser
//! - Static HTTP GET fetching
//! - The rendered-then-static fallback policy
//! - HEAD reachability checks

use crate::config::HttpConfig;
use crate::extract::RenderMethod;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Errors raised while fetching a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },
}

/// A strategy that resolves a URL to HTML
///
/// `settle_delay` is how long to wait after the page has loaded before the
/// HTML is read; strategies that do not execute scripts ignore it.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url, settle_delay: Duration) -> Result<String, FetchError>;
}

/// HTML for one page and how it was obtained
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    pub render_method: RenderMethod,
}

/// Outcome of a HEAD reachability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reachability {
    /// True for a 2xx status
    pub success: bool,

    pub status: u16,

    /// Canonical reason phrase for the status
    pub status_text: String,
}

/// Builds an HTTP client that presents itself as a desktop browser
///
/// Sends the configured User-Agent plus Accept, Accept-Language and
/// Cache-Control headers on every request. Redirects are followed.
///
/// # Example
///
/// ```no_run
/// use siteglean::config::HttpConfig;
/// use siteglean::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    match HeaderValue::from_str(&config.accept_language) {
        Ok(value) => {
            headers.insert(ACCEPT_LANGUAGE, value);
        }
        Err(_) => {
            tracing::warn!(
                "Ignoring invalid Accept-Language value: {:?}",
                config.accept_language
            );
        }
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP GET strategy
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    client: Client,
}

impl StaticFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with its own client
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &Url, _settle_delay: Duration) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }
}

fn classify_error(url: &Url, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: e,
        }
    }
}

/// Fetches pages with the rendered strategy first and static as fallback
///
/// With `js_render` set and a renderer available, the page is rendered in a
/// headless browser; any rendering failure falls back to a static GET. A page
/// only fails when every attempted strategy fails.
#[derive(Clone)]
pub struct PageFetcher {
    static_fetcher: Arc<dyn Fetcher>,
    renderer: Option<Arc<dyn Fetcher>>,
}

impl PageFetcher {
    pub fn new(static_fetcher: Arc<dyn Fetcher>, renderer: Arc<dyn Fetcher>) -> Self {
        Self {
            static_fetcher,
            renderer: Some(renderer),
        }
    }

    /// A fetcher with no renderer; `js_render` requests go straight to static
    pub fn static_only(static_fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            static_fetcher,
            renderer: None,
        }
    }

    pub async fn fetch(
        &self,
        url: &Url,
        js_render: bool,
        settle_delay: Duration,
    ) -> Result<FetchedPage, FetchError> {
        if js_render {
            if let Some(renderer) = &self.renderer {
                match renderer.fetch(url, settle_delay).await {
                    Ok(html) => {
                        return Ok(FetchedPage {
                            html,
                            render_method: RenderMethod::Rendered,
                        })
                    }
                    Err(e) => {
                        tracing::warn!("Rendered fetch of {} failed, falling back to static: {}", url, e);
                    }
                }
            }
        }

        let html = self.static_fetcher.fetch(url, settle_delay).await?;
        Ok(FetchedPage {
            html,
            render_method: RenderMethod::Static,
        })
    }
}

/// Sends a HEAD request and reports the status without crawling
///
/// Network failures are returned as errors; any HTTP status, including
/// errors, is a successful check with `success` reflecting the status.
///
/// # Arguments
///
/// * `client` - Client carrying the browser-like default headers
/// * `url` - URL to check
///
/// # Returns
///
/// * `Ok(Reachability)` - The server answered with some status
/// * `Err(FetchError)` - No HTTP response (connection failure or timeout)
pub async fn check_reachability(client: &Client, url: &Url) -> Result<Reachability, FetchError> {
    let response = client
        .head(url.as_str())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    Ok(Reachability {
        success: status.is_success(),
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
    })
}
