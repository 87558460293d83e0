//! URL handling module for Siteglean
//!
//! This module provides URL normalization (the crawl's dedup key) and the
//! host comparison behind the same-site restriction.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, same_host};
pub use normalize::{normalize_url, parse_seed, TRACKING_PARAMS};
