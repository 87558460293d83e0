//! BFS frontier and visited set for a single crawl
//!
//! Both structures are keyed by normalized URL and live only as long as the
//! crawl that owns them.

use crate::crawler::types::FrontierEntry;
use std::collections::{HashSet, VecDeque};

/// FIFO queue of URLs awaiting a visit
///
/// A URL is queued at most once while it waits; the depth recorded is the
/// depth at which it was first discovered, which is the shortest in BFS order.
#[derive(Debug, Default)]
pub struct Frontier {
    /// Entries in discovery order, with the key each was queued under
    queue: VecDeque<(String, FrontierEntry)>,

    /// Normalized keys of the entries currently queued
    queued: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an entry under `key`
    ///
    /// Returns false if an entry with the same key is already waiting.
    pub fn push(&mut self, key: String, entry: FrontierEntry) -> bool {
        if !self.queued.insert(key.clone()) {
            return false;
        }
        self.queue.push_back((key, entry));
        true
    }

    /// Removes the oldest entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let (key, entry) = self.queue.pop_front()?;
        self.queued.remove(&key);
        Some(entry)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.queued.contains(key)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Normalized keys of every URL dequeued in this crawl
#[derive(Debug, Default)]
pub struct VisitedSet {
    keys: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` visited, returning false if it already was
    pub fn insert(&mut self, key: String) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
