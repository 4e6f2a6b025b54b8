/// URL and crawl state definitions for tracking crawl progress
use std::fmt;

/// Lifecycle of a single URL record
///
/// `Queued → Fetching → {Included, Excluded, Failed}`; the last three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlStatus {
    /// Waiting in the frontier
    Queued,

    /// Claimed by a worker
    Fetching,

    /// Fetched successfully; becomes a sitemap entry
    Included,

    /// Skipped on purpose (disallowed by robots.txt)
    Excluded,

    /// Fetch failed permanently
    Failed,
}

impl UrlStatus {
    /// Returns true if a transition from `self` to `next` is legal
    pub fn can_transition_to(&self, next: UrlStatus) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Fetching)
                | (Self::Fetching, Self::Included)
                | (Self::Fetching, Self::Excluded)
                | (Self::Fetching, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Included => "included",
            Self::Excluded => "excluded",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible statuses
    pub fn all() -> [Self; 5] {
        [
            Self::Queued,
            Self::Fetching,
            Self::Included,
            Self::Excluded,
            Self::Failed,
        ]
    }
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Crawl-level state: `Init → Running → Draining → Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Frontier created, nothing seeded yet
    Init,

    /// Work is queued
    Running,

    /// Queue is empty but workers are still mid-fetch
    Draining,

    /// Queue is empty and no worker is mid-fetch
    Done,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}
