//! linkcrawl main entry point
//!
//! This is the command-line interface for the linkcrawl site crawler. Results
//! go to stdout as a JSON array; logs go to stderr.

use anyhow::Context;
use clap::Parser;
use linkcrawl::config::{load_config_with_hash, validate, Credentials, CrawlerConfig, FileConfig};
use linkcrawl::output::{JsonWriter, OutputHandler, OutputOptions};
use linkcrawl::{ConfigError, CrawlResult, Crawler};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// linkcrawl: a concurrent site crawler
///
/// Crawls every page reachable from URL that shares its prefix, printing one
/// JSON object per page with the links found on it. The crawler does not
/// follow redirects specially.
#[derive(Parser, Debug)]
#[command(name = "linkcrawl")]
#[command(version)]
#[command(about = "A concurrent, depth-bounded site crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Path to a TOML configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print errors to stderr in addition to reporting them in the JSON
    #[arg(long)]
    errors_to_stderr: bool,

    /// Indent output instead of printing one object per line
    #[arg(long)]
    indent: bool,

    /// On HTTP GET failure, retry this many times [default: 0]
    #[arg(long)]
    retries: Option<u32>,

    /// Milliseconds to sleep between retries [default: 100]
    #[arg(long, value_name = "MS")]
    retry_sleep: Option<u64>,

    /// HTTP GET timeout in seconds [default: 60]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Max depth to crawl to, or -1 for unlimited [default: -1]
    #[arg(long, allow_negative_numbers = true)]
    max_depth: Option<i32>,

    /// Follow URLs outside the crawl URL; without --max-depth this may run indefinitely
    #[arg(long)]
    follow_external: bool,

    /// Number of concurrent fetches [default: 10]
    #[arg(long)]
    workers: Option<usize>,

    /// Detect loops by hashing each HTML page
    #[arg(long)]
    hash_check: bool,

    /// Username for HTTP basic auth
    #[arg(long, env = "CRAWLER_USER")]
    username: Option<String>,

    /// Password for HTTP basic auth
    #[arg(long, env = "CRAWLER_PASS", hide_env_values = true)]
    password: Option<String>,

    /// Custom User-Agent header
    #[arg(long)]
    user_agent: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli).context("invalid configuration")?;
    let seed = cli.url.trim().to_string();
    let crawler = Crawler::new(config).context("failed to set up crawler")?;

    let writer = Arc::new(JsonWriter::new(
        std::io::stdout(),
        OutputOptions {
            indent: cli.indent,
            errors_to_stderr: cli.errors_to_stderr,
        },
    ));
    writer.begin()?;

    let sink = Arc::clone(&writer);
    let on_result = move |result: CrawlResult| {
        if let Err(e) = sink.handle(&result) {
            tracing::error!("Could not write result for {}: {}", result.url, e);
        }
    };

    tokio::select! {
        summary = crawler.crawl(&seed, on_result) => {
            writer.finish()?;
            tracing::info!(
                "Done: {} pages, {} errors, {} non-HTML skipped, {} duplicate pages",
                summary.emitted,
                summary.failed,
                summary.non_html,
                summary.duplicate_content
            );
            Ok(())
        }
        _ = interrupted() => {
            writer.finish()?;
            eprintln!("Incomplete: interrupted by signal");
            std::process::exit(1);
        }
    }
}

/// Resolves once the process receives Ctrl-C
///
/// Never resolves if the signal handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for interrupts: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkcrawl=info,warn"),
            1 => EnvFilter::new("linkcrawl=debug,info"),
            2 => EnvFilter::new("linkcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the crawler configuration from the config file and flags
///
/// Flags win over the file, which wins over the defaults.
fn build_config(cli: &Cli) -> Result<CrawlerConfig, ConfigError> {
    if cli.url.trim().is_empty() {
        return Err(ConfigError::MissingSeed);
    }

    let file = match &cli.config {
        Some(path) => {
            let (file, hash) = load_config_with_hash(path)?;
            tracing::info!("Loaded configuration from {} (hash: {})", path.display(), hash);
            file
        }
        None => FileConfig::default(),
    };
    let mut config = file.into_crawler_config();

    if let Some(retries) = cli.retries {
        config.retries = retries;
    }
    if let Some(ms) = cli.retry_sleep {
        config.retry_delay = Duration::from_millis(ms);
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(user_agent) = cli.user_agent.as_ref().filter(|ua| !ua.is_empty()) {
        config.user_agent = Some(user_agent.clone());
    }
    config.follow_external |= cli.follow_external;
    config.hash_check |= cli.hash_check;

    let username = cli.username.clone().filter(|u| !u.is_empty());
    let password = cli.password.clone().filter(|p| !p.is_empty());
    if username.is_some() || password.is_some() {
        let base = config.auth.take();
        config.auth = Some(Credentials {
            username: username
                .or_else(|| base.as_ref().map(|auth| auth.username.clone()))
                .unwrap_or_default(),
            password: password
                .or_else(|| base.map(|auth| auth.password))
                .unwrap_or_default(),
        });
    }

    validate(&config)?;
    Ok(config)
}
