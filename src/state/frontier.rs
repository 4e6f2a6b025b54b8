//! Shared crawl frontier
//!
//! The frontier owns the breadth-first work queue and the seen-set. It is the
//! only mutable state shared by the crawl workers; every mutation goes through
//! one mutex, so "check seen and mark seen" is a single atomic step and two
//! workers can never enqueue the same canonical URL.

use crate::state::{CrawlPhase, UrlStatus};
use crate::url::CanonicalUrl;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// A URL known to the crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    /// Canonical form, the deduplication key
    pub url: CanonicalUrl,

    /// Link hops from the seed (0 = seed)
    pub depth: u32,

    /// Monotonic discovery order
    pub discovered_at: u64,

    pub status: UrlStatus,
}

#[derive(Debug)]
struct FrontierInner {
    queue: VecDeque<UrlRecord>,
    /// The seen-set: every URL ever queued or adopted, with its current state
    records: HashMap<CanonicalUrl, UrlRecord>,
    next_order: u64,
    in_flight: usize,
    phase: CrawlPhase,
}

impl FrontierInner {
    fn insert(&mut self, url: CanonicalUrl, depth: u32, status: UrlStatus) -> Option<UrlRecord> {
        if self.records.contains_key(&url) {
            return None;
        }

        let record = UrlRecord {
            url: url.clone(),
            depth,
            discovered_at: self.next_order,
            status,
        };
        self.next_order += 1;
        self.records.insert(url, record.clone());
        Some(record)
    }

    fn set_status(&mut self, url: &CanonicalUrl, status: UrlStatus) {
        if let Some(record) = self.records.get_mut(url) {
            if !record.status.can_transition_to(status) {
                tracing::debug!(
                    "Unexpected transition for {}: {} -> {}",
                    url,
                    record.status,
                    status
                );
            }
            record.status = status;
        }
    }

    fn update_phase(&mut self) {
        let next = if !self.queue.is_empty() {
            CrawlPhase::Running
        } else if self.in_flight > 0 {
            CrawlPhase::Draining
        } else if self.phase == CrawlPhase::Init {
            CrawlPhase::Init
        } else {
            CrawlPhase::Done
        };

        if next != self.phase {
            tracing::debug!("Crawl phase {} -> {}", self.phase, next);
            self.phase = next;
        }
    }
}

/// Breadth-first work queue plus seen-set, shared by all workers
#[derive(Debug)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    changed: Notify,
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FrontierInner {
                queue: VecDeque::new(),
                records: HashMap::new(),
                next_order: 0,
                in_flight: 0,
                phase: CrawlPhase::Init,
            }),
            changed: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues the seed URL at depth 0 and moves the crawl to `Running`
    pub fn seed(&self, url: CanonicalUrl) -> bool {
        let seeded = {
            let mut inner = self.lock();
            if inner.phase == CrawlPhase::Init {
                inner.phase = CrawlPhase::Running;
            }
            let seeded = self.push(&mut inner, url, 0);
            inner.update_phase();
            seeded
        };
        self.changed.notify_waiters();
        seeded
    }

    /// Marks `url` as seen and queues it, unless it was already seen
    ///
    /// Returns `true` if the URL was newly queued.
    pub fn try_enqueue(&self, url: CanonicalUrl, depth: u32) -> bool {
        let queued = {
            let mut inner = self.lock();
            let queued = self.push(&mut inner, url, depth);
            inner.update_phase();
            queued
        };
        if queued {
            self.changed.notify_waiters();
        }
        queued
    }

    fn push(&self, inner: &mut FrontierInner, url: CanonicalUrl, depth: u32) -> bool {
        match inner.insert(url, depth, UrlStatus::Queued) {
            Some(record) => {
                inner.queue.push_back(record);
                true
            }
            None => false,
        }
    }

    /// Records a URL that is represented by another page (a canonical-link
    /// target) without queueing it for a fetch
    ///
    /// Returns `true` if the URL had not been seen before.
    pub fn adopt(&self, url: CanonicalUrl, depth: u32) -> bool {
        self.lock().insert(url, depth, UrlStatus::Included).is_some()
    }

    /// Takes the next URL to fetch, waiting while other workers may still
    /// produce more work
    ///
    /// Returns `None` once the queue is empty and no worker is mid-fetch.
    pub async fn next(&self) -> Option<UrlRecord> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.lock();
                if let Some(mut record) = inner.queue.pop_front() {
                    record.status = UrlStatus::Fetching;
                    inner.set_status(&record.url, UrlStatus::Fetching);
                    inner.in_flight += 1;
                    inner.update_phase();
                    return Some(record);
                }

                if inner.in_flight == 0 {
                    inner.update_phase();
                    drop(inner);
                    self.changed.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Moves a fetched URL to its terminal status and releases its worker slot
    pub fn complete(&self, url: &CanonicalUrl, status: UrlStatus) {
        {
            let mut inner = self.lock();
            inner.set_status(url, status);
            inner.in_flight = inner.in_flight.saturating_sub(1);
            inner.update_phase();
        }
        self.changed.notify_waiters();
    }

    pub fn phase(&self) -> CrawlPhase {
        self.lock().phase
    }

    /// Number of URLs waiting in the queue
    pub fn queued_len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of URLs ever seen
    pub fn seen_len(&self) -> usize {
        self.lock().records.len()
    }

    /// Count of records per status
    pub fn status_counts(&self) -> HashMap<UrlStatus, usize> {
        let inner = self.lock();
        let mut counts = HashMap::new();
        for record in inner.records.values() {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        counts
    }
}
