//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first crawl driver. A fixed pool of
//! workers pulls URLs from the shared [`Frontier`]; for each URL a worker runs
//! the politeness gate, the fetch, link extraction, and feeds new links back
//! into the frontier while recording a sitemap entry for the page.
//!
//! The crawl ends when the frontier is empty and no worker is mid-fetch.

use crate::config::{validate, Config};
use crate::crawler::fetcher::{build_http_client, fetch, RetryPolicy};
use crate::crawler::parser::{canonical_target, extract_links, parse_html};
use crate::crawler::scheduler::{Permit, Politeness};
use crate::output::{build_index, partition, CrawlStatistics, SitemapEntry, SitemapFile, SitemapIndex};
use crate::state::{Frontier, UrlRecord, UrlStatus};
use crate::url::{CanonicalUrl, Canonicalizer};
use crate::Result;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::task::JoinSet;
use url::Url;

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Canonical seed URL
    pub seed: CanonicalUrl,

    /// Included entries in the order they were recorded
    pub entries: Vec<SitemapEntry>,

    /// The entries split into sitemap files
    pub files: Vec<SitemapFile>,

    /// Present only when more than one file was produced
    pub index: Option<SitemapIndex>,

    pub stats: CrawlStatistics,
}

/// Included entries, deduplicated by `loc`
#[derive(Debug, Default)]
struct Accumulator {
    entries: Vec<SitemapEntry>,
    locs: HashSet<CanonicalUrl>,
}

impl Accumulator {
    fn push(&mut self, entry: SitemapEntry) -> bool {
        if !self.locs.insert(entry.loc.clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }
}

/// State shared by every worker
struct Shared {
    config: Config,
    canonicalizer: Canonicalizer,
    frontier: Frontier,
    politeness: Politeness,
    client: Client,
    retry: RetryPolicy,
    accumulator: Mutex<Accumulator>,
    processed: AtomicUsize,
    started: Instant,
    crawl_date: NaiveDate,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    shared: Arc<Shared>,
}

impl Coordinator {
    /// Creates a new coordinator for one crawl
    ///
    /// # Arguments
    ///
    /// * `seed` - Validated absolute http(s) seed URL
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SitemapError)` - The configuration is invalid, the seed has no
    ///   host, or the HTTP client could not be built
    pub fn new(seed: &Url, config: Config) -> Result<Self> {
        validate(&config)?;
        let canonicalizer = Canonicalizer::new(seed, &config)?;
        let client = build_http_client(&config)?;
        let politeness = Politeness::new(client.clone(), &config);

        Ok(Self {
            shared: Arc::new(Shared {
                retry: RetryPolicy::from_config(&config),
                config,
                canonicalizer,
                frontier: Frontier::new(),
                politeness,
                client,
                accumulator: Mutex::new(Accumulator::default()),
                processed: AtomicUsize::new(0),
                started: Instant::now(),
                crawl_date: Utc::now().date_naive(),
            }),
        })
    }

    /// Runs the crawl to completion
    ///
    /// This is the core crawling logic that:
    /// 1. Seeds the frontier at depth 0
    /// 2. Runs `max_concurrent_requests` workers until the frontier drains
    /// 3. Partitions the included entries into sitemap files
    pub async fn run(self) -> Result<CrawlReport> {
        let shared = self.shared;
        let seed = shared.canonicalizer.seed().clone();

        tracing::info!(
            "Starting crawl of {} (max depth {}, {} workers, {} req/s)",
            seed,
            shared.config.max_depth,
            shared.config.max_concurrent_requests,
            shared.config.requests_per_second
        );

        shared.frontier.seed(seed.clone());

        let mut workers = JoinSet::new();
        for id in 0..shared.config.max_concurrent_requests.max(1) {
            workers.spawn(run_worker(id, Arc::clone(&shared)));
        }
        while let Some(result) = workers.join_next().await {
            result?;
        }

        tracing::info!(
            "Frontier is empty, crawl complete ({} URLs processed in {:.1}s)",
            shared.processed.load(Ordering::Relaxed),
            shared.started.elapsed().as_secs_f64()
        );

        let entries = {
            let mut accumulator = shared
                .accumulator
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut accumulator.entries)
        };

        let files = partition(entries.clone(), shared.config.max_urls_per_sitemap);
        let base = Url::parse(&format!("{}/", seed.as_url().origin().ascii_serialization()))?;
        let index = build_index(&files, &base, Utc::now());

        let stats = CrawlStatistics {
            total_urls: shared.frontier.seen_len(),
            urls_by_status: shared.frontier.status_counts(),
            sitemap_entries: entries.len(),
            sitemap_files: files.len(),
            max_depth_reached: entries.iter().map(|e| e.depth).max().unwrap_or(0),
            requests_by_host: shared.politeness.request_counts(),
            elapsed: shared.started.elapsed(),
        };

        Ok(CrawlReport {
            seed,
            entries,
            files,
            index,
            stats,
        })
    }
}

async fn run_worker(id: usize, shared: Arc<Shared>) {
    while let Some(record) = shared.frontier.next().await {
        let status = shared.process(&record).await;
        tracing::debug!("{} -> {}", record.url, status);
        shared.frontier.complete(&record.url, status);

        let processed = shared.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if processed % 10 == 0 {
            let elapsed = shared.started.elapsed().as_secs_f64();
            tracing::info!(
                "Progress: {} URLs processed, {} queued, {:.2} URLs/sec",
                processed,
                shared.frontier.queued_len(),
                processed as f64 / elapsed.max(f64::EPSILON)
            );
        }
    }
    tracing::trace!("Worker {} finished", id);
}

impl Shared {
    /// Gate, fetch and extract one URL, returning its terminal status
    async fn process(&self, record: &UrlRecord) -> UrlStatus {
        let url = record.url.as_url();

        if self.politeness.permit(url).await == Permit::Denied {
            tracing::debug!("Disallowed by robots.txt: {}", url);
            return UrlStatus::Excluded;
        }

        let page = {
            let Some(_permit) = self.politeness.throttle(url).await else {
                return UrlStatus::Failed;
            };
            match fetch(&self.client, url, self.retry).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", url, e);
                    return UrlStatus::Failed;
                }
            }
        };

        let lastmod = Some(page.last_modified.unwrap_or(self.crawl_date));

        if !page.is_html() {
            self.include(SitemapEntry::new(record.url.clone(), record.depth, lastmod));
            return UrlStatus::Included;
        }

        let parsed = parse_html(&page.body);

        let mut loc = record.url.clone();
        if let Some(target) = canonical_target(&parsed, &page.url, &self.canonicalizer) {
            if target != record.url {
                if self.politeness.permit(target.as_url()).await == Permit::Denied {
                    tracing::debug!(
                        "{} declares canonical {}, which robots.txt disallows",
                        record.url,
                        target
                    );
                } else {
                    tracing::debug!("{} declares canonical {}", record.url, target);
                    self.frontier.adopt(target.clone(), record.depth);
                    loc = target;
                }
            }
        }
        self.include(SitemapEntry::new(loc, record.depth, lastmod));

        if record.depth < self.config.max_depth {
            let next_depth = record.depth + 1;
            let mut queued = 0;
            for link in extract_links(&parsed, &page.url, &self.canonicalizer) {
                if self.frontier.try_enqueue(link, next_depth) {
                    queued += 1;
                }
            }
            tracing::trace!("{} queued {} new links", record.url, queued);
        }

        UrlStatus::Included
    }

    fn include(&self, entry: SitemapEntry) {
        let mut accumulator = self
            .accumulator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !accumulator.push(entry) {
            tracing::trace!("Duplicate sitemap entry skipped");
        }
    }
}
