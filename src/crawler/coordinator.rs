//! Crawler coordinator - main crawl orchestration logic
//!
//! Every discovered URL becomes one tokio task. A task claims its URL in the
//! session's visited set, waits for an admission slot, fetches the page
//! through the retry policy, extracts and resolves its links, emits a
//! [`CrawlResult`] and hands its in-scope links back to the coordinator.
//!
//! The coordinator owns all tasks in a [`JoinSet`]. Children returned by a
//! finished task are spawned into the set before the next completion is
//! awaited, so the set only becomes empty once no task is running and none
//! has children left to start.

use crate::config::{validate, CrawlerConfig};
use crate::crawler::fetcher::{Fetch, HttpFetcher};
use crate::crawler::parser::extract_hrefs;
use crate::crawler::result::{CrawlResult, CrawlSummary};
use crate::crawler::session::CrawlSession;
use crate::url::{is_in_scope, resolve_link};
use crate::{ConfigResult, LinkErrors, PageError};
use std::sync::Arc;
use tokio::task::JoinSet;

/// A URL waiting to be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u32,
}

impl CrawlTask {
    /// The first task of a crawl; its empty URL stands for the seed
    fn root() -> Self {
        Self {
            url: String::new(),
            depth: 0,
        }
    }
}

/// Main crawler structure
///
/// Holds the configuration and the fetcher. Each call to [`Crawler::crawl`]
/// runs with fresh session state, so one crawler can run several crawls,
/// even at the same time.
pub struct Crawler<F = HttpFetcher> {
    config: Arc<CrawlerConfig>,
    fetcher: Arc<F>,
}

impl Crawler<HttpFetcher> {
    /// Creates a crawler that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Successfully created crawler
    /// * `Err(CrawlError)` - Invalid configuration, or the HTTP client could not be built
    pub fn new(config: CrawlerConfig) -> crate::Result<Self> {
        validate(&config)?;
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, fetcher)?)
    }
}

impl<F> Crawler<F>
where
    F: Fetch + 'static,
{
    /// Creates a crawler around any [`Fetch`] implementation
    pub fn with_fetcher(config: CrawlerConfig, fetcher: F) -> ConfigResult<Self> {
        validate(&config)?;
        Ok(Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
        })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Crawls everything reachable from `seed`
    ///
    /// `on_result` is called once for every crawled URL, possibly from many
    /// tasks at the same time and in no particular order. Returns after the
    /// last task has finished.
    ///
    /// Dropping the returned future aborts every task still running.
    pub async fn crawl<C>(&self, seed: &str, on_result: C) -> CrawlSummary
    where
        C: Fn(CrawlResult) + Send + Sync + 'static,
    {
        let session = Arc::new(CrawlSession::new(seed, &self.config));
        let on_result = Arc::new(on_result);
        let mut tasks = JoinSet::new();

        tracing::info!(
            "Starting crawl of {} (max depth: {}, workers: {}, hash check: {}, follow external: {})",
            seed,
            self.config.max_depth,
            self.config.workers,
            self.config.hash_check,
            self.config.follow_external
        );

        self.spawn(&mut tasks, &session, &on_result, CrawlTask::root());

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(children) => {
                    for child in children {
                        self.spawn(&mut tasks, &session, &on_result, child);
                    }
                }
                Err(e) => {
                    tracing::error!("Crawl task failed: {}", e);
                    session.record_panic();
                }
            }
        }

        let summary = session.summary();
        tracing::info!(
            "Crawl completed: {} pages crawled ({} with errors) in {:?}",
            summary.emitted,
            summary.failed,
            summary.elapsed
        );
        summary
    }

    fn spawn<C>(
        &self,
        tasks: &mut JoinSet<Vec<CrawlTask>>,
        session: &Arc<CrawlSession>,
        on_result: &Arc<C>,
        task: CrawlTask,
    ) where
        C: Fn(CrawlResult) + Send + Sync + 'static,
    {
        let config = Arc::clone(&self.config);
        let fetcher = Arc::clone(&self.fetcher);
        let session = Arc::clone(session);
        let on_result = Arc::clone(on_result);

        tasks.spawn(async move {
            run_task(task, &session, &config, fetcher.as_ref(), on_result.as_ref()).await
        });
    }
}

/// Crawls `seed` over HTTP with `config`
///
/// Convenience wrapper around [`Crawler::new`] and [`Crawler::crawl`].
///
/// # Example
///
/// ```no_run
/// use linkcrawl::{crawl, CrawlerConfig};
///
/// # async fn example() -> Result<(), linkcrawl::CrawlError> {
/// let summary = crawl("https://example.com/", CrawlerConfig::default(), |result| {
///     println!("{} -> {} links", result.url, result.found_urls.len());
/// })
/// .await?;
/// println!("{} pages", summary.emitted);
/// # Ok(())
/// # }
/// ```
pub async fn crawl<C>(
    seed: &str,
    config: CrawlerConfig,
    on_result: C,
) -> crate::Result<CrawlSummary>
where
    C: Fn(CrawlResult) + Send + Sync + 'static,
{
    let crawler = Crawler::new(config)?;
    Ok(crawler.crawl(seed, on_result).await)
}

/// Processes one URL and returns the tasks for its in-scope links
async fn run_task<F, C>(
    task: CrawlTask,
    session: &CrawlSession,
    config: &CrawlerConfig,
    fetcher: &F,
    on_result: &C,
) -> Vec<CrawlTask>
where
    F: Fetch + ?Sized,
    C: Fn(CrawlResult),
{
    let CrawlTask { url, depth } = task;
    let url = if url.is_empty() && depth == 0 {
        session.seed().to_string()
    } else {
        url
    };

    if !session.detector().mark_visited(&url) {
        tracing::trace!("Already claimed: {}", url);
        session.record_duplicate_url();
        return Vec::new();
    }

    let Some(result) = visit(&url, depth, session, config, fetcher).await else {
        return Vec::new();
    };

    let children = if config.descends_from(depth) {
        result
            .found_urls
            .iter()
            .filter(|link| is_in_scope(session.seed(), link, config.follow_external))
            .map(|link| CrawlTask {
                url: link.clone(),
                depth: depth + 1,
            })
            .collect()
    } else {
        Vec::new()
    };

    if let Some(error) = &result.error {
        tracing::debug!("Crawled {} at depth {} with error: {}", url, depth, error);
    } else {
        tracing::debug!(
            "Crawled {} at depth {}: {} links, {} to follow",
            url,
            depth,
            result.found_urls.len(),
            children.len()
        );
    }

    session.record_emitted(result.is_error());
    on_result(result);

    children
}

/// Fetches and parses one claimed URL
///
/// Returns None when the page is skipped without a result.
async fn visit<F>(
    url: &str,
    depth: u32,
    session: &CrawlSession,
    config: &CrawlerConfig,
    fetcher: &F,
) -> Option<CrawlResult>
where
    F: Fetch + ?Sized,
{
    let body = {
        // the slot covers the request and the body read only
        let _permit = session.admit().await;
        tracing::trace!("Fetching {} ({} slots free)", url, session.free_slots());

        let page = match session.retry().fetch(fetcher, url).await {
            Ok(page) => page,
            Err(error) => return Some(CrawlResult::failed(url, depth, error)),
        };

        if !page.is_html() {
            tracing::debug!(
                "Skipping {}: content type {}",
                url,
                page.content_type.as_deref().unwrap_or_default()
            );
            session.record_non_html();
            return None;
        }

        let body = match page.read_body(config.hash_check).await {
            Ok(body) => body,
            Err(error) => return Some(CrawlResult::failed(url, depth, PageError::Body(error))),
        };

        if let Some(fingerprint) = body.fingerprint {
            if let Some(original) = session.detector().check_fingerprint(url, fingerprint) {
                tracing::debug!(
                    "Content of {} matches {} ({})",
                    url,
                    original,
                    hex::encode(fingerprint)
                );
                session.record_duplicate_content();
                return Some(CrawlResult::failed(
                    url,
                    depth,
                    PageError::DuplicateContent { original },
                ));
            }
        }

        body
    };

    let mut found_urls = Vec::new();
    let mut link_errors = LinkErrors::default();
    for href in extract_hrefs(&body.bytes) {
        match resolve_link(url, &href) {
            Ok(link) => found_urls.push(link),
            Err(error) => {
                tracing::debug!("Unresolvable link on {}: {}", url, error);
                link_errors.push(error);
            }
        }
    }

    Some(CrawlResult {
        url: url.to_string(),
        depth,
        found_urls,
        error: (!link_errors.is_empty()).then(|| PageError::Links(link_errors)),
    })
}
