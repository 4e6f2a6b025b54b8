//! Politeness layer: robots.txt gating and request throttling
//!
//! This module handles:
//! - Per-origin robots.txt rules (fetched once, cached for the run)
//! - A global token-bucket limiter at `requests_per_second`
//! - Global concurrency limiting via a semaphore
//! - Per-host spacing when robots.txt declares a crawl-delay longer than the
//!   token interval

use crate::config::Config;
use crate::robots::RobotsCache;
use crate::state::DomainState;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// Token bucket shared by every worker
///
/// Capacity equals the configured rate (at least one token); tokens refill
/// continuously and [`RateBudget::acquire`] blocks until one is available.
#[derive(Debug)]
pub struct RateBudget {
    capacity: f64,
    per_second: f64,
    bucket: tokio::sync::Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateBudget {
    pub fn new(requests_per_second: f64) -> Self {
        let capacity = requests_per_second.max(1.0);
        Self {
            capacity,
            per_second: requests_per_second,
            bucket: tokio::sync::Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Time between two tokens at the steady rate
    pub fn token_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.per_second)
    }

    /// Waits until a token is available and takes it
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.per_second).min(self.capacity);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }

                Duration::from_secs_f64((1.0 - bucket.tokens) / self.per_second)
            };

            tracing::trace!("Rate budget exhausted, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}

/// Outcome of the robots.txt check for a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permit {
    Allowed,
    Denied,
}

/// Held for the duration of one fetch; releases the concurrency slot on drop
#[derive(Debug)]
pub struct ThrottlePermit {
    _slot: OwnedSemaphorePermit,
}

/// Politeness gate shared by all crawl workers
///
/// The politeness layer coordinates:
/// - Robots.txt decisions (`permit`)
/// - Global concurrency limits (max in-flight fetches)
/// - The global request rate
/// - Crawl-delay spacing per host
#[derive(Debug)]
pub struct Politeness {
    robots: RobotsCache,
    budget: RateBudget,
    in_flight: Arc<Semaphore>,
    hosts: Mutex<HashMap<String, DomainState>>,
}

impl Politeness {
    /// Creates the politeness layer
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for robots.txt requests
    /// * `config` - The crawler configuration
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            robots: RobotsCache::new(client, Duration::from_secs(config.robots_timeout_secs)),
            budget: RateBudget::new(config.requests_per_second),
            in_flight: Arc::new(Semaphore::new(config.max_concurrent_requests)),
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Checks the URL against the robots.txt rules of its origin
    ///
    /// The first call for an origin fetches robots.txt.
    pub async fn permit(&self, url: &Url) -> Permit {
        let robots = self.robots.policy_for(url).await;

        let mut target = url.path().to_string();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(query);
        }

        if robots.policy.is_allowed(&target) {
            Permit::Allowed
        } else {
            Permit::Denied
        }
    }

    /// Waits for a concurrency slot, a rate token and (when robots.txt asks
    /// for it) the host's crawl-delay
    ///
    /// Returns `None` only if the concurrency semaphore was closed.
    pub async fn throttle(&self, url: &Url) -> Option<ThrottlePermit> {
        let slot = self.in_flight.clone().acquire_owned().await.ok()?;

        self.budget.acquire().await;

        let crawl_delay = self
            .robots
            .cached(url)
            .and_then(|robots| robots.policy.crawl_delay())
            .unwrap_or_default();
        let host = url.host_str().unwrap_or_default().to_string();

        let wait = {
            let mut hosts = self.hosts.lock().unwrap_or_else(PoisonError::into_inner);
            let state = hosts.entry(host.clone()).or_default();
            let now = Instant::now();
            if crawl_delay > self.budget.token_interval() {
                state.reserve(crawl_delay, now)
            } else {
                state.record_request(now);
                Duration::ZERO
            }
        };

        if !wait.is_zero() {
            tracing::debug!("Crawl-delay for {}: waiting {:?}", host, wait);
            tokio::time::sleep(wait).await;
        }

        Some(ThrottlePermit { _slot: slot })
    }

    /// Number of requests started per host
    pub fn request_counts(&self) -> HashMap<String, u32> {
        let hosts = self.hosts.lock().unwrap_or_else(PoisonError::into_inner);
        hosts
            .iter()
            .map(|(host, state)| (host.clone(), state.request_count))
            .collect()
    }
}
