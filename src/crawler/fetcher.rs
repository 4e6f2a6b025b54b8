//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests with retry for transient failures
//! - Error classification
//! - Content-type gating (only HTML bodies are kept for link extraction)

use crate::config::Config;
use chrono::{DateTime, NaiveDate};
use reqwest::header::{CONTENT_TYPE, LAST_MODIFIED};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::error::Error as StdError;
use std::io;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A successfully fetched response
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects
    pub url: Url,

    pub status: StatusCode,

    /// Content-Type header value (empty when absent)
    pub content_type: String,

    /// Date part of the Last-Modified header, when present and parseable
    pub last_modified: Option<NaiveDate>,

    /// Response body; only read for HTML responses, empty otherwise
    pub body: String,
}

impl Page {
    /// Returns true if the response declared an HTML content type
    pub fn is_html(&self) -> bool {
        is_html_content_type(&self.content_type)
    }
}

/// Why a fetch did not produce a [`Page`]
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} returned HTTP {status}")]
    Status { url: Url, status: StatusCode },

    #[error("request to {url} timed out")]
    Timeout { url: Url },

    #[error("could not connect to {url}: {source}")]
    Connection {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        let url = url.clone();
        if error.is_timeout() {
            Self::Timeout { url }
        } else if error.is_connect() || is_dropped_connection(&error) {
            Self::Connection { url, source: error }
        } else {
            Self::Request { url, source: error }
        }
    }

    /// Returns true for failures worth retrying: timeouts, connection
    /// failures (including resets after connect) and 5xx responses
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => status.is_server_error(),
            Self::Timeout { .. } | Self::Connection { .. } => true,
            Self::Request { .. } => false,
        }
    }
}

/// Whether the peer reset or closed the connection mid-request
fn is_dropped_connection(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_error.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        if let Some(hyper_error) = cause.downcast_ref::<hyper::Error>() {
            if hyper_error.is_incomplete_message() || hyper_error.is_closed() {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

/// Retry settings for page fetches
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Linear backoff base: retry `n` waits `n * backoff`
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    fn delay_for(&self, retry: u32) -> Duration {
        self.backoff * retry
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent and timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitemap_crawler::config::Config;
/// use sitemap_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.request_timeout_secs.min(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, retrying transient failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | HTTP 4xx | Immediate failure |
/// | HTTP 5xx | Retry up to `max_retries` times, linear backoff |
/// | Timeout | Retry up to `max_retries` times, linear backoff |
/// | Connection failure or reset | Retry up to `max_retries` times, linear backoff |
/// | Other request errors | Immediate failure |
///
/// Redirects are followed by the client (at most 10 hops). Bodies of non-HTML
/// responses are not downloaded.
pub async fn fetch(client: &Client, url: &Url, retry: RetryPolicy) -> Result<Page, FetchError> {
    let mut attempt = 0;
    loop {
        match fetch_once(client, url).await {
            Ok(page) => return Ok(page),
            Err(e) if e.is_transient() && attempt < retry.max_retries => {
                attempt += 1;
                let delay = retry.delay_for(attempt);
                tracing::debug!(
                    "Transient failure ({}), retry {}/{} in {:?}",
                    e,
                    attempt,
                    retry.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn fetch_once(client: &Client, url: &Url) -> Result<Page, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.clone(),
            status,
        });
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let last_modified = response
        .headers()
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date);

    let body = if is_html_content_type(&content_type) {
        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?
    } else {
        String::new()
    };

    Ok(Page {
        url: final_url,
        status,
        content_type,
        last_modified,
        body,
    })
}

fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Parses an HTTP date (`Wed, 21 Oct 2015 07:28:00 GMT`) into its calendar date
fn parse_http_date(value: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.date_naive())
}
