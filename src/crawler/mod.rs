//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Static HTTP and headless-browser fetching with fallback
//! - Same-host link extraction
//! - The breadth-first frontier and visited set
//! - Overall crawl coordination under a timeout

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod renderer;
mod types;

pub use coordinator::Crawler;
pub use fetcher::{
    build_http_client, check_reachability, FetchError, FetchedPage, Fetcher, PageFetcher,
    Reachability, StaticFetcher,
};
pub use frontier::{Frontier, VisitedSet};
pub use parser::extract_links;
pub use renderer::RenderedFetcher;
pub use types::{page_delimiter, CrawlRequest, CrawlResult, FrontierEntry, PageResult};

use crate::config::Config;
use std::sync::Arc;

/// Builds the production page fetcher from configuration
///
/// Static fetching uses `client`; rendered fetching launches a headless
/// browser per page with the configured viewport and User-Agent.
pub fn build_page_fetcher(config: &Config, client: reqwest::Client) -> PageFetcher {
    let static_fetcher = StaticFetcher::new(client);
    let renderer = RenderedFetcher::new(config.browser.clone(), config.http.user_agent.clone());
    PageFetcher::new(Arc::new(static_fetcher), Arc::new(renderer))
}
