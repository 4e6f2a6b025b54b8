//! Robots.txt parser implementation
//!
//! This module turns robots.txt content into a [`RobotsPolicy`] using the
//! tokenizer from the robotstxt crate. Only the wildcard (`User-agent: *`)
//! group is kept.

use robotstxt::{parse_robotstxt, RobotsParseHandler};
use std::time::Duration;

/// Longest crawl-delay honored; larger declared values are capped
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// Parsed robots.txt rules for one host
///
/// `Disallow` values are literal path prefixes: `Disallow: /admin` blocks
/// `/admin`, `/admin/users` and `/administrator`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotsPolicy {
    disallowed: Vec<String>,
    crawl_delay: Option<Duration>,
}

impl RobotsPolicy {
    /// Parses robots.txt content
    ///
    /// Content that contains no recognizable directives yields an allow-all policy.
    pub fn from_content(content: &str) -> Self {
        let mut collector = WildcardGroupCollector::default();
        parse_robotstxt(content, &mut collector);

        Self {
            disallowed: collector.disallowed,
            crawl_delay: collector.crawl_delay,
        }
    }

    /// Creates a permissive policy
    ///
    /// This is used when robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks whether a path (optionally with query) may be fetched
    ///
    /// # Examples
    ///
    /// ```
    /// use sitemap_crawler::robots::RobotsPolicy;
    ///
    /// let robots = RobotsPolicy::from_content("User-agent: *\nDisallow: /admin");
    /// assert!(robots.is_allowed("/"));
    /// assert!(!robots.is_allowed("/admin/users"));
    /// ```
    pub fn is_allowed(&self, path: &str) -> bool {
        !self
            .disallowed
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// The disallowed path prefixes of the wildcard group
    pub fn disallowed(&self) -> &[String] {
        &self.disallowed
    }

    /// Crawl-delay declared for the wildcard group, if any
    pub fn crawl_delay(&self) -> Option<Duration> {
        self.crawl_delay
    }
}

/// Collects the rules that apply to `User-agent: *`
///
/// Consecutive `User-agent` lines form one group; the first rule line closes
/// the agent list, and the next `User-agent` line starts a new group.
#[derive(Debug, Default)]
struct WildcardGroupCollector {
    in_wildcard_group: bool,
    group_has_rules: bool,
    disallowed: Vec<String>,
    crawl_delay: Option<Duration>,
}

impl WildcardGroupCollector {
    fn start_rule(&mut self) -> bool {
        self.group_has_rules = true;
        self.in_wildcard_group
    }
}

impl RobotsParseHandler for WildcardGroupCollector {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, user_agent: &str) {
        if self.group_has_rules {
            self.in_wildcard_group = false;
            self.group_has_rules = false;
        }
        if user_agent.trim() == "*" {
            self.in_wildcard_group = true;
        }
    }

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {
        self.start_rule();
    }

    fn handle_disallow(&mut self, _line_num: u32, value: &str) {
        let value = value.trim();
        // An empty Disallow allows everything
        if self.start_rule() && !value.is_empty() {
            self.disallowed.push(value.to_string());
        }
    }

    fn handle_sitemap(&mut self, _line_num: u32, _value: &str) {}

    fn handle_unknown_action(&mut self, _line_num: u32, action: &str, value: &str) {
        if !action.trim().eq_ignore_ascii_case("crawl-delay") {
            return;
        }
        if self.start_rule() {
            if let Ok(seconds) = value.trim().parse::<f64>() {
                if seconds.is_finite() && seconds >= 0.0 {
                    let capped = seconds.min(MAX_CRAWL_DELAY.as_secs_f64());
                    self.crawl_delay = Some(Duration::from_secs_f64(capped));
                }
            }
        }
    }
}
