use std::time::{Duration, Instant};

/// Tracks the request timing of a single host
///
/// Used to keep consecutive requests to one host at least `min_delay` apart
/// when robots.txt declares a crawl-delay.
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// Number of requests started against this host
    pub request_count: u32,

    /// Timestamp of the last request to this host
    pub last_request_time: Option<Instant>,
}

impl DomainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a request was made to this host
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, min_delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < min_delay {
            Some(min_delay - elapsed)
        } else {
            None
        }
    }

    /// Reserves the next request slot and returns how long to wait before using it
    ///
    /// The slot is recorded immediately, so a second caller reserving right
    /// after gets a slot `min_delay` later instead of the same one.
    pub fn reserve(&mut self, min_delay: Duration, now: Instant) -> Duration {
        let wait = self.time_until_next_request(min_delay, now).unwrap_or_default();
        self.record_request(now + wait);
        wait
    }
}
