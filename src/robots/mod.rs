//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! A robots.txt that cannot be fetched never stops the crawl; the host is
//! treated as fully allowed instead.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::{RobotsPolicy, MAX_CRAWL_DELAY};

use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Fetches and parses `/robots.txt` for an origin
///
/// Network errors, timeouts and non-200 responses are logged as warnings and
/// yield [`RobotsPolicy::allow_all`].
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - The origin to fetch from (e.g. `https://example.com`)
/// * `timeout` - Timeout for the whole request
pub async fn fetch_robots(client: &Client, origin: &str, timeout: Duration) -> RobotsPolicy {
    let robots_url = format!("{}/robots.txt", origin.trim_end_matches('/'));

    let response = match client.get(&robots_url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Could not read robots.txt from {}: {}", robots_url, e);
            return RobotsPolicy::allow_all();
        }
    };

    if response.status() != StatusCode::OK {
        tracing::warn!(
            "Failed to fetch robots.txt from {}: Status {}",
            robots_url,
            response.status().as_u16()
        );
        return RobotsPolicy::allow_all();
    }

    match response.text().await {
        Ok(body) => {
            let policy = RobotsPolicy::from_content(&body);
            tracing::info!(
                "Successfully parsed robots.txt from {} ({} disallow rules)",
                robots_url,
                policy.disallowed().len()
            );
            policy
        }
        Err(e) => {
            tracing::warn!("Could not read robots.txt body from {}: {}", robots_url, e);
            RobotsPolicy::allow_all()
        }
    }
}
