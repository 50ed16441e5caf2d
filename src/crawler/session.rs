//! State shared by every task of a single crawl
//!
//! A session is created for each call to [`Crawler::crawl`](crate::Crawler::crawl)
//! and dropped when that call returns, so concurrent crawls in one process
//! never see each other's visited URLs or fingerprints.

use crate::crawler::loop_detector::LoopDetector;
use crate::crawler::result::CrawlSummary;
use crate::crawler::retry::RetryPolicy;
use crate::config::CrawlerConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::{Semaphore, SemaphorePermit};

/// Emitted results between progress log lines
const PROGRESS_INTERVAL: usize = 10;

pub struct CrawlSession {
    /// Seed URL, also the scope prefix when external links are not followed
    seed: String,

    /// Visited URLs and content fingerprints
    detector: LoopDetector,

    /// Bounds the number of fetches in flight
    admission: Semaphore,

    retry: RetryPolicy,

    stats: SessionStats,

    started: Instant,
}

#[derive(Debug, Default)]
struct SessionStats {
    emitted: AtomicUsize,
    failed: AtomicUsize,
    duplicate_urls: AtomicUsize,
    non_html: AtomicUsize,
    duplicate_content: AtomicUsize,
    panicked: AtomicUsize,
}

impl CrawlSession {
    pub fn new(seed: impl Into<String>, config: &CrawlerConfig) -> Self {
        Self {
            seed: seed.into(),
            detector: LoopDetector::new(),
            admission: Semaphore::new(config.workers),
            retry: RetryPolicy::from_config(config),
            stats: SessionStats::default(),
            started: Instant::now(),
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn detector(&self) -> &LoopDetector {
        &self.detector
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Waits for an admission slot
    ///
    /// The slot is released when the permit is dropped.
    pub async fn admit(&self) -> SemaphorePermit<'_> {
        match self.admission.acquire().await {
            Ok(permit) => permit,
            // the semaphore is private to the session and never closed
            Err(_) => unreachable!("admission semaphore closed"),
        }
    }

    /// Number of slots currently free
    pub fn free_slots(&self) -> usize {
        self.admission.available_permits()
    }

    pub fn record_emitted(&self, is_error: bool) {
        let emitted = self.stats.emitted.fetch_add(1, Ordering::Relaxed) + 1;
        if is_error {
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
        }

        if emitted % PROGRESS_INTERVAL == 0 {
            let elapsed = self.started.elapsed();
            tracing::info!(
                "Progress: {} pages crawled, {} URLs seen, {:.2} pages/sec",
                emitted,
                self.detector.visited_count(),
                emitted as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
            );
        }
    }

    pub fn record_duplicate_url(&self) {
        self.stats.duplicate_urls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_non_html(&self) {
        self.stats.non_html.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate_content(&self) {
        self.stats.duplicate_content.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_panic(&self) {
        self.stats.panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            emitted: self.stats.emitted.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
            duplicate_urls: self.stats.duplicate_urls.load(Ordering::Relaxed),
            non_html: self.stats.non_html.load(Ordering::Relaxed),
            duplicate_content: self.stats.duplicate_content.load(Ordering::Relaxed),
            panicked: self.stats.panicked.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }
}
