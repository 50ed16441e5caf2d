//! Crawler module for concurrent site traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and response classification
//! - Retry logic for failed fetches
//! - Visited-URL and content-fingerprint loop detection
//! - HTML link extraction
//! - Task orchestration with bounded concurrency

mod coordinator;
mod fetcher;
mod loop_detector;
mod parser;
mod result;
mod retry;
mod session;

pub use coordinator::{crawl, CrawlTask, Crawler};
pub use fetcher::{build_http_client, BodyStream, Fetch, FetchedPage, HttpFetcher, PageBody};
pub use loop_detector::{Fingerprint, LoopDetector};
pub use parser::extract_hrefs;
pub use result::{CrawlResult, CrawlSummary};
pub use retry::RetryPolicy;
pub use session::CrawlSession;
