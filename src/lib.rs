//! Siteglean: a bounded single-site crawler
//!
//! This crate crawls a website breadth-first from a seed URL, staying on the
//! seed's host, and returns the readable text and metadata of every page it
//! managed to fetch. Crawls are bounded by page count, link depth and a
//! wall-clock budget, and identical crawls are served from a TTL cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod url;

use thiserror::Error;

pub use crawler::FetchError;
pub use extract::ExtractError;

/// Main error type for Siteglean operations
///
/// Per-page fetch and extraction failures never surface here; the crawl
/// absorbs them.
#[derive(Debug, Error)]
pub enum GleanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
///
/// Besides problems with the TOML file, this covers invalid crawl requests:
/// a request that cannot be crawled at all is a configuration problem.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("URL is required")]
    MissingUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid request body: {0}")]
    Request(#[from] serde_json::Error),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Siteglean operations
pub type Result<T> = std::result::Result<T, GleanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{ApiRequest, ApiResponse, Harvester};
pub use cache::ResultCache;
pub use config::Config;
pub use crawler::{CrawlRequest, CrawlResult, Crawler};
pub use extract::PageMetadata;
pub use crate::url::{extract_domain, normalize_url};
