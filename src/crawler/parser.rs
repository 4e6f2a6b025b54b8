//! HTML parser for extracting links and the canonical hint
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from `<a>` tags)
//! - The `<link rel="canonical">` hint
//!
//! Extraction is a pure function of the page body and its URL.

use crate::url::{CanonicalUrl, Canonicalizer};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Raw information extracted from an HTML page, before canonicalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Anchor targets in document order, as written in the page
    pub hrefs: Vec<String>,

    /// Target of the first `<link rel="canonical">`, if any
    pub canonical_hint: Option<String>,
}

/// Parses HTML content and extracts anchors and the canonical hint
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same-page anchors)
/// - Empty hrefs
///
/// `rel="nofollow"` links are followed.
///
/// # Example
///
/// ```
/// use sitemap_crawler::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.hrefs, vec!["/page".to_string()]);
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        hrefs: extract_hrefs(&document),
        canonical_hint: extract_canonical(&document),
    }
}

fn extract_hrefs(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_followable(href))
        .map(str::to_string)
        .collect()
}

fn extract_canonical(document: &Html) -> Option<String> {
    let selector = Selector::parse("link[rel][href]").ok()?;

    document
        .select(&selector)
        .find(|element| {
            element
                .value()
                .attr("rel")
                .map(|rel| {
                    rel.split_ascii_whitespace()
                        .any(|token| token.eq_ignore_ascii_case("canonical"))
                })
                .unwrap_or(false)
        })
        .and_then(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Filters hrefs that can never lead to another page
fn is_followable(href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !(lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:"))
}

/// Canonicalizes the anchors of a parsed page
///
/// Links rejected by the canonicalizer are dropped silently. The result is
/// deduplicated, keeping the first occurrence of each URL.
pub fn extract_links(
    page: &ParsedPage,
    base_url: &Url,
    canonicalizer: &Canonicalizer,
) -> Vec<CanonicalUrl> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for href in &page.hrefs {
        match canonicalizer.canonicalize(base_url, href) {
            Ok(url) => {
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
            Err(rejection) => {
                tracing::trace!("Dropping link {} on {}: {}", href, base_url, rejection);
            }
        }
    }

    links
}

/// Resolves the page's canonical hint, if it names an in-scope URL
pub fn canonical_target(
    page: &ParsedPage,
    base_url: &Url,
    canonicalizer: &Canonicalizer,
) -> Option<CanonicalUrl> {
    let hint = page.canonical_hint.as_deref()?;
    match canonicalizer.canonicalize(base_url, hint) {
        Ok(url) => Some(url),
        Err(rejection) => {
            tracing::trace!("Ignoring canonical hint {} on {}: {}", hint, base_url, rejection);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn canonicalizer() -> Canonicalizer {
        let seed = Url::parse("https://example.com/").unwrap();
        Canonicalizer::new(&seed, &Config::default()).unwrap()
    }

    fn links_of(html: &str) -> Vec<String> {
        extract_links(&parse_html(html), &base_url(), &canonicalizer())
            .into_iter()
            .map(|url| url.to_string())
            .collect()
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        assert_eq!(links_of(html), vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let html = r#"<html><body><a href="other">Link</a></body></html>"#;
        assert_eq!(links_of(html), vec!["https://example.com/other"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <html><body>
                <a href="javascript:void(0)">js</a>
                <a href="mailto:test@example.com">Email</a>
                <a href="tel:+1234567890">Call</a>
                <a href="data:text/html,<h1>Test</h1>">Data</a>
            </body></html>
        "#;
        assert!(parse_html(html).hrefs.is_empty());
    }

    #[test]
    fn test_skip_download_link() {
        let html = r#"<html><body><a href="/file.html" download>Download</a></body></html>"#;
        assert!(parse_html(html).hrefs.is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let html = r##"<html><body><a href="#section">Jump</a><a href="">Self</a></body></html>"##;
        assert!(parse_html(html).hrefs.is_empty());
    }

    #[test]
    fn test_follow_nofollow_links() {
        let html = r#"<html><body><a href="/page2" rel="nofollow">Link</a></body></html>"#;
        assert_eq!(links_of(html), vec!["https://example.com/page2"]);
    }

    #[test]
    fn test_off_site_links_dropped() {
        let html = r#"<html><body><a href="https://other.com/page3">Away</a><a href="/home">Home</a></body></html>"#;
        assert_eq!(links_of(html), vec!["https://example.com/home"]);
    }

    #[test]
    fn test_links_deduplicated_in_order() {
        let html = r#"
            <html>
            <body>
                <a href="/b">B</a>
                <a href="/a">A</a>
                <a href="/b#top">B again</a>
                <a href="https://EXAMPLE.com/a">A again</a>
            </body>
            </html>
        "#;
        assert_eq!(
            links_of(html),
            vec!["https://example.com/b", "https://example.com/a"]
        );
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let html = r#"<html><body><a href="/x">X</a><a href="/y">Y</a></body></html>"#;
        assert_eq!(links_of(html), links_of(html));
    }

    #[test]
    fn test_canonical_hint() {
        let html = r#"<html><head><link rel="canonical" href="/canonical"></head><body></body></html>"#;
        let parsed = parse_html(html);
        assert_eq!(parsed.canonical_hint.as_deref(), Some("/canonical"));
        assert!(parsed.hrefs.is_empty());

        let target = canonical_target(&parsed, &base_url(), &canonicalizer()).unwrap();
        assert_eq!(target.as_str(), "https://example.com/canonical");
    }

    #[test]
    fn test_off_site_canonical_hint_ignored() {
        let html = r#"<html><head><link rel="Canonical" href="https://mirror.org/page"></head></html>"#;
        let parsed = parse_html(html);
        assert!(parsed.canonical_hint.is_some());
        assert!(canonical_target(&parsed, &base_url(), &canonicalizer()).is_none());
    }

    #[test]
    fn test_stylesheet_link_is_not_canonical() {
        let html = r#"<html><head><link rel="stylesheet" href="/style.css"></head></html>"#;
        assert_eq!(parse_html(html).canonical_hint, None);
    }

    #[test]
    fn test_malformed_html_still_parses() {
        let html = r#"<html><body><div><a href="/ok">ok<p></div></span><a href="/also">"#;
        assert_eq!(
            links_of(html),
            vec!["https://example.com/ok", "https://example.com/also"]
        );
    }
}
