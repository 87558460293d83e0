//! The request/response entry point
//!
//! `Harvester` turns an `ApiRequest` into an `ApiResponse`: it validates the
//! request against the configured defaults, answers "test only" requests
//! with a HEAD check, and otherwise runs a crawl through the result cache.

mod types;

pub use types::{ApiRequest, ApiResponse, ErrorBody, BAD_REQUEST};

use crate::cache::{cache_key, Clock, ResultCache, SystemClock};
use crate::config::{Config, CrawlerConfig};
use crate::crawler::{build_http_client, build_page_fetcher, check_reachability};
use crate::crawler::{CrawlRequest, CrawlResult, Crawler};
use crate::{ConfigError, ConfigResult, GleanError};
use std::time::Duration;

/// Status for a reachability check that never got an HTTP answer
const BAD_GATEWAY: u16 = 502;

const INTERNAL_ERROR: u16 = 500;

/// Serves crawl and reachability requests
pub struct Harvester<C: Clock = SystemClock> {
    crawler: Crawler,
    client: reqwest::Client,
    defaults: CrawlerConfig,
    cache: Option<ResultCache<C>>,
}

impl Harvester<SystemClock> {
    /// Builds a harvester with production fetchers from configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let client = build_http_client(&config.http)?;
        let crawler = Crawler::new(build_page_fetcher(config, client.clone()));

        let cache = if config.cache.enabled {
            Some(ResultCache::new(config.cache.ttl()?))
        } else {
            None
        };

        Ok(Self::new(crawler, client, config.crawler.clone(), cache))
    }
}

impl<C: Clock> Harvester<C> {
    pub fn new(
        crawler: Crawler,
        client: reqwest::Client,
        defaults: CrawlerConfig,
        cache: Option<ResultCache<C>>,
    ) -> Self {
        Self {
            crawler,
            client,
            defaults,
            cache,
        }
    }

    pub fn cache(&self) -> Option<&ResultCache<C>> {
        self.cache.as_ref()
    }

    /// Handles one request
    ///
    /// Never fails: problems are reported as `ApiResponse::Error` carrying
    /// the status code to return.
    pub async fn handle(&self, request: ApiRequest) -> ApiResponse {
        let crawl_request = match self.build_request(&request) {
            Ok(crawl_request) => crawl_request,
            Err(e) => {
                tracing::info!("Rejected request: {}", e);
                return e.into();
            }
        };

        if request.test_only {
            return match check_reachability(&self.client, &crawl_request.seed).await {
                Ok(reachability) => {
                    tracing::info!(
                        "Reachability check for {}: {} {}",
                        crawl_request.seed,
                        reachability.status,
                        reachability.status_text
                    );
                    ApiResponse::Reachability(reachability)
                }
                Err(e) => {
                    tracing::warn!("Reachability check failed: {}", e);
                    ApiResponse::error(BAD_GATEWAY, e.to_string())
                }
            };
        }

        match self.crawl(&crawl_request).await {
            Ok(result) => ApiResponse::Crawl(result),
            Err(GleanError::Config(e)) => e.into(),
            Err(e) => {
                tracing::error!("Crawl of {} failed: {}", crawl_request.seed, e);
                ApiResponse::error(INTERNAL_ERROR, e.to_string())
            }
        }
    }

    /// Resolves an `ApiRequest` into a validated `CrawlRequest`
    ///
    /// # Arguments
    ///
    /// * `request` - The incoming request; unset fields take configured defaults
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRequest)` - A request ready to crawl
    /// * `Err(ConfigError)` - Missing or invalid URL, or out-of-range bounds
    pub fn build_request(&self, request: &ApiRequest) -> ConfigResult<CrawlRequest> {
        let url = request.url.as_deref().ok_or(ConfigError::MissingUrl)?;
        let mut crawl_request = CrawlRequest::with_defaults(url, &self.defaults)?;

        if let Some(max_pages) = request.max_pages {
            crawl_request = crawl_request.max_pages(max_pages);
        }
        if let Some(depth) = request.depth {
            crawl_request = crawl_request.max_depth(depth);
        }
        if let Some(timeout) = request.timeout {
            crawl_request = crawl_request.timeout(Duration::from_millis(timeout));
        }
        if let Some(js_render) = request.js_render {
            crawl_request = crawl_request.js_render(js_render);
        }
        if let Some(wait_time) = request.wait_time {
            crawl_request = crawl_request.settle_delay(Duration::from_millis(wait_time));
        }

        crawl_request.validate()?;
        Ok(crawl_request)
    }

    /// Crawls, serving identical requests from the cache while fresh
    ///
    /// Partial results from timed-out crawls are cached like any other.
    pub async fn crawl(&self, request: &CrawlRequest) -> crate::Result<CrawlResult> {
        let Some(cache) = &self.cache else {
            return self.crawler.crawl(request).await;
        };

        let key = cache_key(request);
        if let Some(result) = cache.get(&key) {
            tracing::info!("Cache hit for {}", request.seed);
            return Ok(result);
        }

        let result = self.crawler.crawl(request).await?;
        cache.put(key, result.clone());
        Ok(result)
    }
}
