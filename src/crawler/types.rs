//! Crawl request and result types

use crate::config::CrawlerConfig;
use crate::extract::PageMetadata;
use crate::url::parse_seed;
use crate::{ConfigError, ConfigResult};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// A validated crawl request
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlRequest {
    /// Seed URL, crawled as given
    pub seed: Url,

    /// Maximum number of pages visited (>= 1)
    pub max_pages: usize,

    /// Maximum link depth from the seed
    pub max_depth: usize,

    /// Wall-clock budget for the whole crawl
    pub timeout: Duration,

    /// Try a headless browser before plain HTTP
    pub js_render: bool,

    /// Wait after page load before reading rendered HTML
    pub settle_delay: Duration,
}

impl CrawlRequest {
    /// Creates a request for `seed` with the built-in defaults
    pub fn new(seed: &str) -> ConfigResult<Self> {
        Self::with_defaults(seed, &CrawlerConfig::default())
    }

    /// Creates a request for `seed` using configured defaults
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute HTTP(S) URL to start from
    /// * `defaults` - Bounds applied until overridden by the builder setters
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRequest)` - The request; bounds are checked by `validate`
    /// * `Err(ConfigError)` - `MissingUrl` for a blank seed, `InvalidUrl` otherwise
    pub fn with_defaults(seed: &str, defaults: &CrawlerConfig) -> ConfigResult<Self> {
        if seed.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }

        let seed = parse_seed(seed).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            seed,
            max_pages: defaults.max_pages,
            max_depth: defaults.max_depth,
            timeout: Duration::from_millis(defaults.timeout_ms),
            js_render: defaults.js_render,
            settle_delay: Duration::from_millis(defaults.settle_delay_ms),
        })
    }

    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn js_render(mut self, js_render: bool) -> Self {
        self.js_render = js_render;
        self
    }

    pub fn settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Checks the request bounds
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_pages < 1 {
            return Err(ConfigError::Validation(format!(
                "maxPages must be >= 1, got {}",
                self.max_pages
            )));
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "timeout must be >= 1ms".to_string(),
            ));
        }

        Ok(())
    }
}

/// A URL waiting in the frontier together with its link depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: usize,
}

/// Text and metadata for one successfully crawled page
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub url: String,
    pub text: String,
    pub metadata: PageMetadata,
}

/// Aggregated output of one crawl
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    /// Page texts, each preceded by a delimiter line naming its URL
    pub content: String,

    /// Every visited URL in visit order, including pages that failed
    pub urls: Vec<String>,

    /// Metadata of pages that produced text, in visit order
    pub metadata: Vec<PageMetadata>,

    /// True if the crawl was cut short by its timeout
    pub timed_out: bool,
}

impl CrawlResult {
    /// Assembles a result from visited URLs and page results
    pub fn from_pages(urls: Vec<String>, pages: Vec<PageResult>, timed_out: bool) -> Self {
        let content = pages
            .iter()
            .map(|page| format!("{}\n{}", page_delimiter(&page.url), page.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            content,
            urls,
            metadata: pages.into_iter().map(|page| page.metadata).collect(),
            timed_out,
        }
    }
}

/// The line that opens each page's text in `CrawlResult::content`
pub fn page_delimiter(url: &str) -> String {
    format!("=== {} ===", url)
}
