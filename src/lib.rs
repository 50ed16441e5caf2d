//! linkcrawl: a concurrent, depth-bounded site crawler
//!
//! This crate walks a web site from a seed URL, following hyperlinks with a
//! bounded number of concurrent fetches, skipping URLs it has already seen and
//! (optionally) pages whose content it has already seen under another URL.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use std::fmt;
use thiserror::Error;

/// Main error type for linkcrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing seed URL")]
    MissingSeed,
}

/// A single failed HTTP attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("{url} returned status code {status}")]
    Status { url: String, status: u16 },

    #[error("reading body of {url} failed: {message}")]
    Body { url: String, message: String },
}

/// URL resolution errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("invalid base URL '{base}': {source}")]
    InvalidBase {
        base: String,
        source: ::url::ParseError,
    },

    #[error("cannot resolve '{href}' against '{base}': {source}")]
    InvalidLink {
        base: String,
        href: String,
        source: ::url::ParseError,
    },
}

/// Every link on a page that failed to resolve
///
/// Renders as one combined message with the individual failures joined by
/// ` && `, in the order they were found on the page.
#[derive(Debug, Default)]
pub struct LinkErrors(pub Vec<UrlError>);

impl LinkErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, error: UrlError) {
        self.0.push(error);
    }

    pub fn iter(&self) -> impl Iterator<Item = &UrlError> {
        self.0.iter()
    }
}

impl fmt::Display for LinkErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" && ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for LinkErrors {}

/// Error attached to the result of a single crawled URL
#[derive(Debug, Error)]
pub enum PageError {
    #[error("giving up after {attempts} attempt(s): {source}")]
    Fetch { attempts: u32, source: FetchError },

    #[error("{0}")]
    Body(FetchError),

    #[error("content already seen at {original}")]
    DuplicateContent { original: String },

    #[error("{0}")]
    Links(#[from] LinkErrors),
}

/// Result type alias for linkcrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Credentials, CrawlerConfig};
pub use crawler::{crawl, CrawlResult, CrawlSummary, Crawler};
pub use url::{is_in_scope, resolve_link};
