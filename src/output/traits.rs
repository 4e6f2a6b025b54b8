//! Sitemap data types and the document trait
//!
//! This module defines the values that flow from the crawl into the writers
//! and the trait every written XML document implements.

use crate::url::CanonicalUrl;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Failed to format output: {0}")]
    Format(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// How often a page is expected to change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Weekly,
}

impl ChangeFreq {
    /// Pages near the seed change more often: `daily` up to depth 1, `weekly` below
    pub fn for_depth(depth: u32) -> Self {
        if depth <= 1 {
            Self::Daily
        } else {
            Self::Weekly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<url>` of a sitemap, derived from an included URL record
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: CanonicalUrl,

    /// Crawl depth of the record this entry came from
    pub depth: u32,

    pub lastmod: Option<NaiveDate>,

    pub changefreq: ChangeFreq,

    /// 0.8 at the seed, 0.1 lower per hop, never below 0.1
    pub priority: f32,
}

impl SitemapEntry {
    pub fn new(loc: CanonicalUrl, depth: u32, lastmod: Option<NaiveDate>) -> Self {
        let priority = (0.8 - 0.1 * depth as f32).max(0.1);
        Self {
            loc,
            depth,
            lastmod,
            changefreq: ChangeFreq::for_depth(depth),
            priority,
        }
    }

    /// Priority with one decimal, as written to the sitemap
    pub fn priority_str(&self) -> String {
        format!("{:.1}", self.priority)
    }
}

/// A bounded run of entries written to one `<urlset>` file
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapFile {
    /// 0 for the unsuffixed `sitemap.xml`, N ≥ 1 for `sitemap-N.xml`
    pub sequence: usize,

    pub entries: Vec<SitemapEntry>,
}

impl SitemapFile {
    pub fn file_name(&self) -> String {
        if self.sequence == 0 {
            INDEX_FILE_NAME.to_string()
        } else {
            format!("sitemap-{}.xml", self.sequence)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Name of the top-level sitemap: the single urlset, or the index
pub const INDEX_FILE_NAME: &str = "sitemap.xml";

/// Name of the HTML listing
pub const HTML_FILE_NAME: &str = "sitemap.html";

/// One `<sitemap>` reference inside an index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// Absolute URL of the referenced sitemap file
    pub loc: String,

    pub lastmod: DateTime<Utc>,
}

/// The `<sitemapindex>` written when more than one sitemap file exists
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapIndex {
    pub entries: Vec<IndexEntry>,
    pub generated_at: DateTime<Utc>,
}

impl SitemapIndex {
    pub fn file_name(&self) -> String {
        INDEX_FILE_NAME.to_string()
    }
}

/// An XML document in the output directory
///
/// Every document is written uncompressed and as a `.gz` sibling.
pub trait SitemapDocument {
    /// File name relative to the output directory
    fn file_name(&self) -> String;

    /// Serialized XML
    fn render(&self) -> OutputResult<Vec<u8>>;
}
