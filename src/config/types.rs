use serde::Deserialize;

/// Main configuration structure for Sitemap-Crawler
///
/// Every key is optional; missing keys take the defaults from [`Config::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of `<url>` entries per sitemap file
    pub max_urls_per_sitemap: usize,

    /// Size of the worker pool and of the in-flight fetch semaphore
    pub max_concurrent_requests: usize,

    /// Global request budget shared by all workers
    pub requests_per_second: f64,

    /// Maximum number of link hops from the seed URL
    pub max_depth: u32,

    /// URLs whose path contains any of these substrings are never crawled
    pub exclude_patterns: Vec<String>,

    /// Allowed file extensions (`""` means "no extension")
    pub valid_extensions: Vec<String>,

    /// Which hosts count as "the same site" as the seed
    pub host_scope: HostScope,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Timeout for a single page request (seconds)
    pub request_timeout_secs: u64,

    /// Timeout for a robots.txt request (seconds)
    pub robots_timeout_secs: u64,

    /// Number of retries after a transient fetch failure
    pub max_retries: u32,

    /// Base delay for linear retry backoff (milliseconds)
    pub retry_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_urls_per_sitemap: 50_000,
            max_concurrent_requests: 10,
            requests_per_second: 2.0,
            max_depth: 3,
            exclude_patterns: ["login", "admin", "wp-admin", "logout"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            valid_extensions: [".html", ".php", ".asp", ".aspx", ""]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            host_scope: HostScope::default(),
            user_agent: "SitemapGenerator/2.0".to_string(),
            request_timeout_secs: 30,
            robots_timeout_secs: 5,
            max_retries: 3,
            retry_backoff_ms: 1000,
        }
    }
}

/// Host matching policy for discovered links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostScope {
    /// Host must equal the seed host
    Exact,

    /// Seed host, its `www.` sibling, and any of its subdomains
    #[serde(alias = "same-site")]
    Subdomains,

    /// Any host under the seed's registrable domain (`shop.example.co.uk`
    /// for a seed on `blog.example.co.uk`)
    #[default]
    RegistrableDomain,
}
