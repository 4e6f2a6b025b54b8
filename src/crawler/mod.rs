//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and link extraction
//! - Robots.txt gating and rate limiting
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{build_http_client, fetch, FetchError, Page, RetryPolicy};
pub use parser::{canonical_target, extract_links, parse_html, ParsedPage};
pub use scheduler::{Permit, Politeness, RateBudget, ThrottlePermit};

use crate::config::Config;
use url::Url;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Canonicalize the seed and build the HTTP client
/// 2. Crawl the site breadth-first under the politeness constraints
/// 3. Partition the included pages into sitemap files (and an index if needed)
///
/// Nothing is written to disk; pass the report to
/// [`write_sitemaps`](crate::output::write_sitemaps) for that.
///
/// # Arguments
///
/// * `seed` - Absolute http(s) seed URL
/// * `config` - The crawler configuration
pub async fn crawl(seed: &Url, config: &Config) -> crate::Result<CrawlReport> {
    Coordinator::new(seed, config.clone())?.run().await
}
