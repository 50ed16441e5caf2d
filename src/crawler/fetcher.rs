//! HTTP fetcher implementation
//!
//! This module handles a single HTTP GET for the crawler:
//! - Building the HTTP client with the configured timeout
//! - Attaching the custom user agent and basic auth credentials
//! - Classifying the response by status code
//! - Exposing the body as a stream so it can be fingerprinted as it is read

use crate::config::{Credentials, CrawlerConfig};
use crate::crawler::loop_detector::Fingerprint;
use crate::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::fmt;

/// Body of a fetched page, chunk by chunk
pub type BodyStream = BoxStream<'static, Result<Bytes, FetchError>>;

/// Performs one fetch attempt for a URL
///
/// Implementations must treat transport errors and non-2xx responses as
/// failures. Retrying is left to [`RetryPolicy`](crate::crawler::RetryPolicy).
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// A successful response whose body has not been read yet
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, if the response had one
    pub content_type: Option<String>,

    body: BodyStream,
}

/// A fully read body and, when requested, its fingerprint
#[derive(Debug)]
pub struct PageBody {
    pub bytes: Vec<u8>,
    pub fingerprint: Option<Fingerprint>,
}

impl FetchedPage {
    pub fn new(
        url: impl Into<String>,
        status: u16,
        content_type: Option<String>,
        body: BodyStream,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            content_type,
            body,
        }
    }

    /// Builds a page whose body is already in memory
    pub fn from_bytes(
        url: impl Into<String>,
        status: u16,
        content_type: Option<&str>,
        body: impl Into<Bytes>,
    ) -> Self {
        let chunk: Result<Bytes, FetchError> = Ok(body.into());
        Self::new(
            url,
            status,
            content_type.map(str::to_string),
            stream::once(async move { chunk }).boxed(),
        )
    }

    /// Returns true unless a Content-Type header says the page is not HTML
    ///
    /// A missing header counts as HTML.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(true, |content_type| content_type.starts_with("text/html"))
    }

    /// Reads the whole body
    ///
    /// With `fingerprint` set, every chunk is fed into a SHA-256 digest as it
    /// arrives, so hashing needs no second pass over the bytes.
    pub async fn read_body(mut self, fingerprint: bool) -> Result<PageBody, FetchError> {
        let mut hasher = fingerprint.then(Sha256::new);
        let mut bytes = Vec::new();

        while let Some(chunk) = self.body.next().await {
            let chunk = chunk?;
            if let Some(hasher) = hasher.as_mut() {
                hasher.update(&chunk);
            }
            bytes.extend_from_slice(&chunk);
        }

        let fingerprint = hasher.map(|hasher| {
            let mut digest = [0u8; 32];
            digest.copy_from_slice(&hasher.finalize());
            digest
        });

        Ok(PageBody { bytes, fingerprint })
    }
}

impl fmt::Debug for FetchedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchedPage")
            .field("url", &self.url)
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Builds an HTTP client for a crawl
///
/// The timeout bounds each request from connecting until the body has been
/// read. Redirects use reqwest's default policy.
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetch`] implementation backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    auth: Option<Credentials>,
    user_agent: Option<String>,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            auth: config.auth.clone(),
            user_agent: config.user_agent.clone(),
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut request = self.client.get(url);
        if let Some(user_agent) = &self.user_agent {
            request = request.header(USER_AGENT, user_agent);
        }
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = request.send().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        let body_url = url.to_string();
        let body = response
            .bytes_stream()
            .map(move |chunk| {
                chunk.map_err(|e| FetchError::Body {
                    url: body_url.clone(),
                    message: e.to_string(),
                })
            })
            .boxed();

        Ok(FetchedPage::new(url, status.as_u16(), content_type, body))
    }
}
