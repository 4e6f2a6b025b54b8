//! Run statistics
//!
//! This module collects the per-status counts of a finished crawl and prints
//! them in a readable block at the end of a run.

use crate::state::UrlStatus;
use std::collections::HashMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Total number of URLs recorded (every status)
    pub total_urls: usize,

    /// Count of URL records by status
    pub urls_by_status: HashMap<UrlStatus, usize>,

    /// Entries written to the sitemap, after canonical-link deduplication
    pub sitemap_entries: usize,

    /// Number of XML sitemap files (not counting the index)
    pub sitemap_files: usize,

    /// Deepest crawl depth among the sitemap entries
    pub max_depth_reached: u32,

    /// Page requests started, per host
    pub requests_by_host: HashMap<String, u32>,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Number of records with the given status
    pub fn count(&self, status: UrlStatus) -> usize {
        self.urls_by_status.get(&status).copied().unwrap_or(0)
    }

    /// Total page requests across hosts
    pub fn total_requests(&self) -> u32 {
        self.requests_by_host.values().sum()
    }

    /// Share of fetched URLs that ended up included, as a percentage
    pub fn success_rate(&self) -> f64 {
        let fetched = self.count(UrlStatus::Included) + self.count(UrlStatus::Failed);
        if fetched == 0 {
            return 0.0;
        }
        (self.count(UrlStatus::Included) as f64 / fetched as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total URLs recorded: {}", stats.total_urls);
    println!("  Sitemap entries: {}", stats.sitemap_entries);
    println!("  Sitemap files: {}", stats.sitemap_files);
    println!("  Deepest level: {}", stats.max_depth_reached);
    println!("  Requests made: {}", stats.total_requests());
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    println!("URLs by Status:");
    for status in UrlStatus::all() {
        let count = stats.count(status);
        if count == 0 {
            continue;
        }
        let percentage = if stats.total_urls > 0 {
            (count as f64 / stats.total_urls as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} fetched URLs included)",
        stats.success_rate(),
        stats.count(UrlStatus::Included),
        stats.count(UrlStatus::Included) + stats.count(UrlStatus::Failed)
    );
}
