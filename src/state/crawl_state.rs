//! Shared crawl state
//!
//! All workers hold an `Arc<CrawlState>`. Each set sits behind its own lock
//! and every critical section covers a single insert or check-and-insert, so
//! workers never serialize on each other for longer than one set operation.

use crate::crawler::FrontierQueue;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One pending fetch obligation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    /// The URL to fetch
    pub url: String,

    /// The page the URL was discovered on (None for the root)
    pub parent_url: Option<String>,
}

impl FrontierItem {
    /// Creates the item that starts a crawl
    pub fn root(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent_url: None,
        }
    }

    /// Creates an item discovered on `parent_url`
    pub fn discovered(url: impl Into<String>, parent_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent_url: Some(parent_url.into()),
        }
    }
}

/// A classified link outcome
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkRecord {
    /// The recorded URL (the final URL after redirects for successes)
    pub url: String,

    /// The page that linked here
    pub parent_url: Option<String>,
}

impl LinkRecord {
    pub fn new(url: impl Into<String>, parent_url: Option<String>) -> Self {
        Self {
            url: url.into(),
            parent_url,
        }
    }
}

/// A link whose fetch failed before any HTTP status was received
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErroredRecord {
    pub url: String,
    pub parent_url: Option<String>,
    /// Human readable error description
    pub message: String,
}

/// Aggregate state shared by the supervisor and every worker
pub struct CrawlState {
    /// Work waiting to be fetched
    pub frontier: FrontierQueue,

    /// Every URL ever enqueued
    visited: Mutex<HashSet<String>>,

    /// Links that answered with a status below 400
    succeeded: Mutex<HashSet<LinkRecord>>,

    /// Links that answered with a status of 400 or above
    failed: Mutex<HashSet<LinkRecord>>,

    /// Links whose fetch raised a network or protocol error
    errored: Mutex<HashSet<ErroredRecord>>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self {
            frontier: FrontierQueue::new(),
            visited: Mutex::new(HashSet::new()),
            succeeded: Mutex::new(HashSet::new()),
            failed: Mutex::new(HashSet::new()),
            errored: Mutex::new(HashSet::new()),
        }
    }

    /// Marks `item.url` visited and enqueues it, unless it was already visited
    ///
    /// The visited check and insert happen under one lock acquisition, so two
    /// workers discovering the same URL concurrently enqueue it exactly once.
    ///
    /// # Returns
    ///
    /// * `true` - The item was new and is now queued
    /// * `false` - The URL had been visited before; nothing was queued
    pub fn admit(&self, item: FrontierItem) -> bool {
        if !lock(&self.visited).insert(item.url.clone()) {
            return false;
        }
        self.frontier.enqueue(item);
        true
    }

    /// Returns true if the URL has ever been enqueued
    pub fn is_visited(&self, url: &str) -> bool {
        lock(&self.visited).contains(url)
    }

    pub fn visited_count(&self) -> usize {
        lock(&self.visited).len()
    }

    pub fn record_succeeded(&self, record: LinkRecord) {
        lock(&self.succeeded).insert(record);
    }

    pub fn record_failed(&self, record: LinkRecord) {
        lock(&self.failed).insert(record);
    }

    pub fn record_errored(&self, record: ErroredRecord) {
        lock(&self.errored).insert(record);
    }

    /// Sorted copy of the visited set
    pub fn visited(&self) -> Vec<String> {
        sorted(lock(&self.visited).iter().cloned())
    }

    /// Sorted copy of the succeeded set
    pub fn succeeded(&self) -> Vec<LinkRecord> {
        sorted(lock(&self.succeeded).iter().cloned())
    }

    /// Sorted copy of the failed set
    pub fn failed(&self) -> Vec<LinkRecord> {
        sorted(lock(&self.failed).iter().cloned())
    }

    /// Sorted copy of the errored set
    pub fn errored(&self) -> Vec<ErroredRecord> {
        sorted(lock(&self.errored).iter().cloned())
    }
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}

/// Locks a set, recovering from poisoning
///
/// Sets are only touched by single inserts and reads, so a panic while the
/// lock was held cannot leave one half-written.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn sorted<T: Ord>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort();
    items
}
