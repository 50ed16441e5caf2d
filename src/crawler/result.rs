//! Records produced by a crawl

use crate::PageError;
use std::time::Duration;

/// Outcome of crawling one URL
///
/// Emitted once per URL that was not skipped as a duplicate or as non-HTML.
#[derive(Debug)]
pub struct CrawlResult {
    /// The URL that was crawled
    pub url: String,

    /// Link distance from the seed URL
    pub depth: u32,

    /// Absolute URLs of every link that resolved, in page order
    pub found_urls: Vec<String>,

    /// Why the page failed, or which of its links failed to resolve
    pub error: Option<PageError>,
}

impl CrawlResult {
    pub(crate) fn failed(url: impl Into<String>, depth: u32, error: PageError) -> Self {
        Self {
            url: url.into(),
            depth,
            found_urls: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Totals for a finished crawl
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrawlSummary {
    /// Results handed to the callback
    pub emitted: usize,

    /// Emitted results that carried an error
    pub failed: usize,

    /// Tasks dropped because their URL had already been claimed
    pub duplicate_urls: usize,

    /// Pages dropped because they were not HTML
    pub non_html: usize,

    /// Pages whose content matched an earlier page
    pub duplicate_content: usize,

    /// Tasks that panicked
    pub panicked: usize,

    /// Wall-clock time of the crawl
    pub elapsed: Duration,
}
