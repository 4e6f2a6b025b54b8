use crate::UrlError;
use url::Url;

/// Normalizes an absolute URL into its canonical (deduplication key) form
///
/// # Normalization Steps
///
/// 1. Reject anything that is not http or https
/// 2. Lowercase the scheme and host
/// 3. Drop the port when it is the scheme's default
/// 4. Collapse duplicate slashes in the path (dot segments are already
///    resolved by the parser)
/// 5. Remove the fragment
/// 6. Remove an empty query string (trailing `?`)
///
/// Applying this function to its own output returns the same URL.
///
/// # Examples
///
/// ```
/// use sitemap_crawler::url::normalize_url;
/// use url::Url;
///
/// let url = Url::parse("HTTP://Example.COM:80//a//b?#top").unwrap();
/// assert_eq!(normalize_url(url).unwrap().as_str(), "http://example.com/a/b");
/// ```
pub fn normalize_url(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?.to_lowercase();
    if host.is_empty() {
        return Err(UrlError::MissingDomain);
    }
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    if url.port().is_some() && url.port() == default_port(url.scheme()) {
        // Only fails for cannot-be-a-base URLs, which http(s) never are
        let _ = url.set_port(None);
    }

    let path = collapse_slashes(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

/// Replaces every run of `/` in a path with a single `/`
fn collapse_slashes(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut previous_slash = false;

    for c in path.chars() {
        if c == '/' {
            if !previous_slash {
                result.push(c);
            }
            previous_slash = true;
        } else {
            result.push(c);
            previous_slash = false;
        }
    }

    if result.is_empty() {
        result.push('/');
    }
    result
}
