//! URL handling module for Sitemap-Crawler
//!
//! This module provides URL canonicalization, domain scoping, and the
//! exclusion/extension filters that decide whether a discovered link belongs
//! in the crawl at all.

mod domain;
mod matcher;
mod normalize;

use crate::config::{Config, HostScope};
use crate::UrlError;
use std::fmt;
use thiserror::Error;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, host_in_scope, registrable_domain};
pub use matcher::{matching_exclusion, normalize_extensions, path_extension};
pub use normalize::normalize_url;

/// A URL in canonical form, used as the deduplication key for the whole crawl
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Why a link was dropped by the canonicalizer
///
/// Rejections are expected during a crawl and are not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("malformed URL")]
    Malformed,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("host {0} is outside the crawl scope")]
    OffSite(String),

    #[error("matches exclusion pattern '{0}'")]
    Excluded(String),

    #[error("extension '{0}' is not allowed")]
    Extension(String),
}

/// Turns raw hrefs into canonical URLs and filters out links that are not
/// part of the site being mapped
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    seed: CanonicalUrl,
    seed_host: String,
    scope: HostScope,
    exclude_patterns: Vec<String>,
    /// `None` disables extension filtering (empty allow-list in the config)
    allowed_extensions: Option<Vec<String>>,
}

impl Canonicalizer {
    /// Creates a canonicalizer scoped to the given seed URL
    ///
    /// The seed itself is normalized but not run through the filters.
    pub fn new(seed: &Url, config: &Config) -> Result<Self, UrlError> {
        let seed = normalize_url(seed.clone())?;
        let seed_host = extract_domain(&seed).ok_or(UrlError::MissingDomain)?;

        let allowed_extensions = if config.valid_extensions.is_empty() {
            None
        } else {
            Some(normalize_extensions(&config.valid_extensions))
        };

        Ok(Self {
            seed: CanonicalUrl(seed),
            seed_host,
            scope: config.host_scope,
            exclude_patterns: config.exclude_patterns.clone(),
            allowed_extensions,
        })
    }

    /// The canonical form of the seed URL
    pub fn seed(&self) -> &CanonicalUrl {
        &self.seed
    }

    /// Resolves `raw_href` against `base_url` and canonicalizes the result
    ///
    /// # Examples
    ///
    /// ```
    /// use sitemap_crawler::{Canonicalizer, Config, Rejection};
    /// use url::Url;
    ///
    /// let seed = Url::parse("https://example.com/").unwrap();
    /// let canonicalizer = Canonicalizer::new(&seed, &Config::default()).unwrap();
    ///
    /// let page = Url::parse("https://example.com/blog/post").unwrap();
    /// let link = canonicalizer.canonicalize(&page, "../about#team").unwrap();
    /// assert_eq!(link.as_str(), "https://example.com/about");
    ///
    /// assert!(matches!(
    ///     canonicalizer.canonicalize(&page, "https://other.org/"),
    ///     Err(Rejection::OffSite(_))
    /// ));
    /// ```
    pub fn canonicalize(&self, base_url: &Url, raw_href: &str) -> Result<CanonicalUrl, Rejection> {
        let resolved = base_url
            .join(raw_href.trim())
            .map_err(|_| Rejection::Malformed)?;
        self.canonicalize_url(resolved)
    }

    /// Canonicalizes an already absolute URL and applies the scope filters
    pub fn canonicalize_url(&self, url: Url) -> Result<CanonicalUrl, Rejection> {
        let url = normalize_url(url).map_err(|e| match e {
            UrlError::InvalidScheme(scheme) => Rejection::UnsupportedScheme(scheme),
            _ => Rejection::Malformed,
        })?;

        let host = extract_domain(&url).ok_or(Rejection::Malformed)?;
        if !host_in_scope(&self.seed_host, &host, self.scope) {
            return Err(Rejection::OffSite(host));
        }

        if let Some(pattern) = matching_exclusion(&url, &self.exclude_patterns) {
            return Err(Rejection::Excluded(pattern.to_string()));
        }

        if let Some(allowed) = &self.allowed_extensions {
            let ext = path_extension(&url);
            if !ext.is_empty() && !allowed.contains(&ext) {
                return Err(Rejection::Extension(ext));
            }
        }

        Ok(CanonicalUrl(url))
    }
}

/// Validates a seed URL supplied by the user
///
/// The URL must be absolute, use http or https, and have a host. A trailing
/// slash is trimmed before parsing.
///
/// # Examples
///
/// ```
/// use sitemap_crawler::validate_seed_url;
///
/// assert!(validate_seed_url("https://example.com/").is_ok());
/// assert!(validate_seed_url("example.com").is_err());
/// assert!(validate_seed_url("ftp://example.com").is_err());
/// ```
pub fn validate_seed_url(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| {
        UrlError::Parse(format!(
            "{} (include the protocol, e.g. https://example.com)",
            e
        ))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}
