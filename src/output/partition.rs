//! Splitting the included entries into protocol-sized sitemap files

use crate::output::traits::{IndexEntry, SitemapEntry, SitemapFile, SitemapIndex};
use chrono::{DateTime, Utc};
use url::Url;

/// Splits entries into files of at most `max_per_file`, keeping discovery order
///
/// When everything fits in one file the result is a single unsuffixed file
/// (sequence 0); otherwise the files are numbered from 1. An empty input still
/// yields one empty file. A `max_per_file` of 0 is treated as 1.
pub fn partition(entries: Vec<SitemapEntry>, max_per_file: usize) -> Vec<SitemapFile> {
    let max_per_file = max_per_file.max(1);

    if entries.len() <= max_per_file {
        return vec![SitemapFile {
            sequence: 0,
            entries,
        }];
    }

    let mut files = Vec::with_capacity(entries.len().div_ceil(max_per_file));
    let mut remaining = entries.into_iter().peekable();
    let mut sequence = 1;
    while remaining.peek().is_some() {
        let chunk: Vec<SitemapEntry> = remaining.by_ref().take(max_per_file).collect();
        files.push(SitemapFile {
            sequence,
            entries: chunk,
        });
        sequence += 1;
    }
    files
}

/// Builds the index for a multi-file sitemap
///
/// Returns `None` when there is only one file. Each file is referenced by its
/// absolute URL under `base_url`.
pub fn build_index(
    files: &[SitemapFile],
    base_url: &Url,
    generated_at: DateTime<Utc>,
) -> Option<SitemapIndex> {
    if files.len() <= 1 {
        return None;
    }

    let entries = files
        .iter()
        .map(|file| {
            let name = file.file_name();
            let loc = base_url
                .join(&name)
                .map(|url| url.to_string())
                .unwrap_or(name);
            IndexEntry {
                loc,
                lastmod: generated_at,
            }
        })
        .collect();

    Some(SitemapIndex {
        entries,
        generated_at,
    })
}
