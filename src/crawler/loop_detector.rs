//! Visited-URL and content-fingerprint bookkeeping for one crawl
//!
//! The URL set and the fingerprint map sit behind separate locks: every task
//! touches the URL set, only tasks that got a page body touch the map.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SHA-256 digest of a page body
pub type Fingerprint = [u8; 32];

#[derive(Debug, Default)]
pub struct LoopDetector {
    visited: Mutex<HashSet<String>>,
    fingerprints: Mutex<HashMap<String, Fingerprint>>,
}

impl LoopDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as visited
    ///
    /// Returns true if this call inserted it, false if some earlier call
    /// already did. The check and the insert happen under one lock, so of
    /// any number of concurrent callers for the same URL exactly one wins.
    pub fn mark_visited(&self, url: &str) -> bool {
        let mut visited = lock(&self.visited);
        if visited.contains(url) {
            return false;
        }
        visited.insert(url.to_string())
    }

    pub fn is_visited(&self, url: &str) -> bool {
        lock(&self.visited).contains(url)
    }

    pub fn visited_count(&self) -> usize {
        lock(&self.visited).len()
    }

    /// Records the fingerprint of `url` unless another URL already has it
    ///
    /// Returns the URL that first produced the same content, in which case
    /// nothing is recorded.
    pub fn check_fingerprint(&self, url: &str, fingerprint: Fingerprint) -> Option<String> {
        let mut fingerprints = lock(&self.fingerprints);
        if let Some((original, _)) = fingerprints
            .iter()
            .find(|(_, existing)| **existing == fingerprint)
        {
            return Some(original.clone());
        }
        fingerprints.insert(url.to_string(), fingerprint);
        None
    }
}

// A panicking task cannot leave either collection half-updated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
