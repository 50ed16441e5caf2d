use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Default per-request timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of concurrent fetches
pub const DEFAULT_WORKERS: usize = 10;

/// Default pause between retries when configured from a file or the CLI
pub const DEFAULT_RETRY_SLEEP_MS: u64 = 100;

/// Runtime configuration of a crawl
///
/// Immutable once a crawl has started. Every crawl started from the same
/// configuration gets its own independent session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerConfig {
    /// Upper bound on a single HTTP request, connect through body
    pub timeout: Duration,

    /// Deepest level to crawl, or -1 for unlimited
    pub max_depth: i32,

    /// Maximum number of fetches in flight at once
    pub workers: usize,

    /// HTTP basic auth credentials sent with every request
    pub auth: Option<Credentials>,

    /// Detect loops by fingerprinting page bodies
    pub hash_check: bool,

    /// Follow links that do not share the seed URL's prefix
    pub follow_external: bool,

    /// Custom User-Agent header
    pub user_agent: Option<String>,

    /// Extra attempts after a failed fetch
    pub retries: u32,

    /// Pause between attempts
    pub retry_delay: Duration,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_depth: -1,
            workers: DEFAULT_WORKERS,
            auth: None,
            hash_check: false,
            follow_external: false,
            user_agent: None,
            retries: 0,
            retry_delay: Duration::ZERO,
        }
    }
}

impl CrawlerConfig {
    /// Returns true if links found on a page at `depth` may be crawled
    pub fn descends_from(&self, depth: u32) -> bool {
        self.is_unbounded() || i64::from(depth) < i64::from(self.max_depth)
    }

    /// Returns true if the depth is unbounded
    pub fn is_unbounded(&self) -> bool {
        self.max_depth < 0
    }
}

/// HTTP basic auth credentials
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Top-level structure of a TOML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub crawler: CrawlerSection,
    pub auth: Option<AuthSection>,
}

/// `[crawler]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlerSection {
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "max-depth")]
    pub max_depth: i32,

    pub workers: usize,

    pub retries: u32,

    #[serde(rename = "retry-sleep-ms")]
    pub retry_sleep_ms: u64,

    #[serde(rename = "hash-check")]
    pub hash_check: bool,

    #[serde(rename = "follow-external")]
    pub follow_external: bool,

    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

impl Default for CrawlerSection {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_depth: -1,
            workers: DEFAULT_WORKERS,
            retries: 0,
            retry_sleep_ms: DEFAULT_RETRY_SLEEP_MS,
            hash_check: false,
            follow_external: false,
            user_agent: None,
        }
    }
}

/// `[auth]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthSection {
    pub username: String,
    pub password: String,
}

impl FileConfig {
    /// Converts the file representation into a runtime configuration
    pub fn into_crawler_config(self) -> CrawlerConfig {
        let section = self.crawler;
        CrawlerConfig {
            timeout: Duration::from_secs(section.timeout_secs),
            max_depth: section.max_depth,
            workers: section.workers,
            auth: self.auth.and_then(|auth| {
                if auth.username.is_empty() && auth.password.is_empty() {
                    None
                } else {
                    Some(Credentials {
                        username: auth.username,
                        password: auth.password,
                    })
                }
            }),
            hash_check: section.hash_check,
            follow_external: section.follow_external,
            user_agent: section.user_agent,
            retries: section.retries,
            retry_delay: Duration::from_millis(section.retry_sleep_ms),
        }
    }
}
