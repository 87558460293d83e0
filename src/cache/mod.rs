//! Crawl result caching
//!
//! This module keeps finished crawl results in memory for a fixed time so
//! that identical crawls are not repeated. Entries expire a fixed TTL after
//! they were written; expired entries are never returned and are dropped on
//! the lookup that finds them or by `purge_expired`.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use crate::crawler::{CrawlRequest, CrawlResult};
use crate::url::normalize_url;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Default entry lifetime
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// A cached crawl result and when it was written
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: CrawlResult,
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    /// Checks if the entry is older than `ttl` at time `now`
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.timestamp >= ttl
    }
}

/// Derives the cache key for a crawl request
///
/// The key covers the normalized seed URL, page budget, depth and rendering
/// mode; changing any of them yields a different key. The timeout and
/// settle delay are not part of the key.
///
/// # Returns
///
/// Hex-encoded SHA-256 digest (64 characters)
pub fn cache_key(request: &CrawlRequest) -> String {
    let seed = normalize_url(request.seed.as_str())
        .map(|u| u.to_string())
        .unwrap_or_else(|_| request.seed.to_string());

    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(b"\n");
    hasher.update(request.max_pages.to_string().as_bytes());
    hasher.update(b"\n");
    hasher.update(request.max_depth.to_string().as_bytes());
    hasher.update(b"\n");
    hasher.update(if request.js_render { b"js" } else { b"no" });
    hex::encode(hasher.finalize())
}

/// In-memory TTL cache of crawl results
///
/// Shared across crawls for the life of the process; writes replace whole
/// entries.
#[derive(Debug)]
pub struct ResultCache<C: Clock = SystemClock> {
    ttl: Duration,
    clock: C,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResultCache<SystemClock> {
    /// Creates a cache on the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl Default for ResultCache<SystemClock> {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_TTL_HOURS))
    }
}

impl<C: Clock> ResultCache<C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached result for `key` unless missing or expired
    pub fn get(&self, key: &str) -> Option<CrawlResult> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        match entries.get(key) {
            Some(entry) if !entry.is_stale(self.ttl, now) => Some(entry.data.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `result` under `key`, replacing any previous entry
    pub fn put(&self, key: String, result: CrawlResult) {
        let entry = CacheEntry {
            data: result,
            timestamp: self.clock.now(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    /// Drops every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_stale(self.ttl, now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
