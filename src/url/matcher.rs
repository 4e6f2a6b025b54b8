use url::Url;

/// Returns the first exclusion pattern contained in the URL's path or query
///
/// Patterns are plain substrings, matched case-sensitively.
///
/// # Examples
///
/// ```
/// use sitemap_crawler::url::matching_exclusion;
/// use url::Url;
///
/// let patterns = vec!["admin".to_string()];
/// let url = Url::parse("https://example.com/wp-admin/edit").unwrap();
/// assert_eq!(matching_exclusion(&url, &patterns), Some("admin"));
/// ```
pub fn matching_exclusion<'a>(url: &Url, patterns: &'a [String]) -> Option<&'a str> {
    let path = url.path();
    let query = url.query().unwrap_or("");

    patterns
        .iter()
        .find(|pattern| path.contains(pattern.as_str()) || query.contains(pattern.as_str()))
        .map(|pattern| pattern.as_str())
}

/// Returns the lowercase extension of the last path segment, without the dot
///
/// A segment without a dot (or ending in `/`) has the empty extension.
pub fn path_extension(url: &Url) -> String {
    let last_segment = url.path().rsplit('/').next().unwrap_or("");

    match last_segment.rfind('.') {
        Some(idx) => last_segment[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Normalizes configured extensions to lowercase without a leading dot
///
/// The empty extension is dropped because it is always allowed.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}
