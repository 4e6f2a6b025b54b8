//! Robots.txt caching implementation
//!
//! Policies are fetched lazily on the first URL seen for an origin and kept
//! for the rest of the run. Concurrent first requests for the same origin
//! share a single fetch.

use crate::robots::{fetch_robots, RobotsPolicy};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

/// Cached robots.txt data for an origin
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt rules
    pub policy: RobotsPolicy,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Wraps a policy with the current timestamp
    pub fn new(policy: RobotsPolicy) -> Self {
        Self {
            policy,
            fetched_at: Utc::now(),
        }
    }
}

type Slot = Arc<OnceCell<Arc<CachedRobots>>>;

/// Process-wide robots.txt cache keyed by origin (`scheme://host:port`)
///
/// Entries are never invalidated within one run.
#[derive(Debug)]
pub struct RobotsCache {
    client: Client,
    timeout: Duration,
    entries: Mutex<HashMap<String, Slot>>,
}

impl RobotsCache {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the policy for the URL's origin, fetching robots.txt on first use
    pub async fn policy_for(&self, url: &Url) -> Arc<CachedRobots> {
        let origin = url.origin().ascii_serialization();

        let slot = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.entry(origin.clone()).or_default().clone()
        };

        slot.get_or_init(|| async {
            let policy = fetch_robots(&self.client, &origin, self.timeout).await;
            Arc::new(CachedRobots::new(policy))
        })
        .await
        .clone()
    }

    /// Returns the cached policy for an origin without fetching
    pub fn cached(&self, url: &Url) -> Option<Arc<CachedRobots>> {
        let origin = url.origin().ascii_serialization();
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(&origin).and_then(|slot| slot.get().cloned())
    }

    /// Number of origins with a cache slot
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
