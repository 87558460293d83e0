//! Configuration module for Siteglean
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a crawl can run without any file at all.
//!
//! # Example
//!
//! ```no_run
//! use siteglean::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("siteglean.toml")).unwrap();
//! println!("Default page budget: {}", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, CacheConfig, Config, CrawlerConfig, HttpConfig, MAX_TTL_SECS};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
