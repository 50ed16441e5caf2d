//! Configuration module for linkcrawl
//!
//! This module holds the runtime crawler configuration and handles loading,
//! parsing, and validating optional TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use linkcrawl::config::load_config;
//! use std::path::Path;
//!
//! let file = load_config(Path::new("crawl.toml")).unwrap();
//! let config = file.into_crawler_config();
//! println!("Crawler will use {} workers", config.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AuthSection, CrawlerConfig, CrawlerSection, Credentials, FileConfig, DEFAULT_RETRY_SLEEP_MS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
