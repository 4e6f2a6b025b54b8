//! Output module for writing sitemaps
//!
//! This module handles:
//! - Partitioning included entries into protocol-sized files
//! - Rendering `<urlset>` and `<sitemapindex>` XML
//! - Gzip copies of every XML file
//! - The HTML listing
//! - Recording run statistics
//!
//! Any write failure aborts the run; partial output is not cleaned up.

mod compress;
mod html;
mod partition;
pub mod stats;
mod traits;
mod xml;

pub use compress::gzip;
pub use html::render_html;
pub use partition::{build_index, partition};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{
    ChangeFreq, IndexEntry, OutputError, OutputResult, SitemapDocument, SitemapEntry,
    SitemapFile, SitemapIndex, HTML_FILE_NAME, INDEX_FILE_NAME,
};
pub use xml::{parse_sitemap_locs, render_index, render_urlset, SITEMAP_NAMESPACE};

use crate::crawler::CrawlReport;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Default output directory for a seed: its host, or `host_port` when the
/// seed has an explicit port
pub fn output_dir_for(seed: &Url) -> PathBuf {
    let host = seed.host_str().unwrap_or("sitemap");
    match seed.port() {
        Some(port) => PathBuf::from(format!("{}_{}", host, port)),
        None => PathBuf::from(host),
    }
}

/// Writes one XML document and its `.gz` sibling
fn write_document(document: &dyn SitemapDocument, dir: &Path) -> OutputResult<Vec<PathBuf>> {
    let payload = document.render()?;

    let xml_path = dir.join(document.file_name());
    fs::write(&xml_path, &payload)?;

    let gz_path = dir.join(format!("{}.gz", document.file_name()));
    fs::write(&gz_path, gzip(&payload)?)?;

    tracing::debug!("Wrote {} and {}", xml_path.display(), gz_path.display());
    Ok(vec![xml_path, gz_path])
}

/// Writes every output file of a crawl into `dir`
///
/// # Files
///
/// - Single file: `sitemap.xml`, `sitemap.xml.gz`
/// - Multiple files: `sitemap.xml` (index), `sitemap-1.xml` … `sitemap-N.xml`,
///   and a `.gz` sibling for each
/// - Always: `sitemap.html`
///
/// # Returns
///
/// The paths written, in write order.
pub fn write_sitemaps(report: &CrawlReport, dir: &Path) -> OutputResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    if report.entries.is_empty() {
        tracing::warn!("No URLs found to include in sitemap");
    }

    let mut written = Vec::new();

    if let Some(index) = &report.index {
        written.extend(write_document(index, dir)?);
    }
    for file in &report.files {
        written.extend(write_document(file, dir)?);
    }

    let html_path = dir.join(HTML_FILE_NAME);
    fs::write(&html_path, render_html(&report.entries))?;
    written.push(html_path);

    match &report.index {
        Some(_) => tracing::info!(
            "Sitemap index generated with {} sitemaps containing {} URLs in {}",
            report.files.len(),
            report.entries.len(),
            dir.display()
        ),
        None => tracing::info!(
            "Sitemap generated with {} URLs in {}",
            report.entries.len(),
            dir.display()
        ),
    }

    Ok(written)
}
