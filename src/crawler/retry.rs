//! Retry policy wrapped around a [`Fetch`] implementation

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{Fetch, FetchedPage};
use crate::PageError;
use std::time::Duration;

/// Bounded retry loop with a fixed pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one fails
    pub retries: u32,

    /// Pause between attempts; zero retries immediately
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.retries, config.retry_delay)
    }

    /// Total number of attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Fetches `url`, retrying failed attempts
    ///
    /// The first successful attempt is returned immediately. When the last
    /// attempt fails its error is returned, wrapped with the attempt count.
    pub async fn fetch<F>(&self, fetcher: &F, url: &str) -> Result<FetchedPage, PageError>
    where
        F: Fetch + ?Sized,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;

        loop {
            match fetcher.fetch(url).await {
                Ok(page) => {
                    if attempt > 1 {
                        tracing::debug!("Fetched {} on attempt {}", url, attempt);
                    }
                    return Ok(page);
                }
                Err(error) if attempt >= max_attempts => {
                    return Err(PageError::Fetch {
                        attempts: attempt,
                        source: error,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        max_attempts,
                        url,
                        error
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
