use crate::config::HostScope;
use std::net::IpAddr;
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitemap_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether `candidate` belongs to the same site as `seed_host`
///
/// Both hosts are expected to be lowercase.
///
/// - [`HostScope::Exact`]: the hosts must be equal.
/// - [`HostScope::Subdomains`]: a leading `www.` is ignored on both sides and
///   any subdomain of the seed host is accepted as well.
/// - [`HostScope::RegistrableDomain`]: both hosts must share a registrable
///   domain per the public suffix list. IP addresses only match themselves;
///   hosts without a registrable domain (`localhost`) fall back to the
///   subdomain rule.
///
/// # Examples
///
/// ```
/// use sitemap_crawler::config::HostScope;
/// use sitemap_crawler::url::host_in_scope;
///
/// let scope = HostScope::RegistrableDomain;
/// assert!(host_in_scope("blog.example.co.uk", "shop.example.co.uk", scope));
/// assert!(!host_in_scope("alice.github.io", "bob.github.io", scope));
/// ```
pub fn host_in_scope(seed_host: &str, candidate: &str, scope: HostScope) -> bool {
    match scope {
        HostScope::Exact => candidate == seed_host,
        HostScope::Subdomains => is_same_or_subdomain(seed_host, candidate),
        HostScope::RegistrableDomain => {
            if is_ip_literal(seed_host) || is_ip_literal(candidate) {
                return candidate == seed_host;
            }
            match (registrable_domain(seed_host), registrable_domain(candidate)) {
                (Some(seed), Some(other)) => seed == other,
                _ => is_same_or_subdomain(seed_host, candidate),
            }
        }
    }
}

/// The registrable domain of a host (`example.co.uk` for `www.example.co.uk`)
///
/// Returns None for IP literals and for hosts that are themselves a public
/// suffix or have no known suffix.
pub fn registrable_domain(host: &str) -> Option<&str> {
    if is_ip_literal(host) {
        return None;
    }
    let host = host.trim_end_matches('.');
    psl::domain_str(host).filter(|domain| domain.contains('.'))
}

fn is_same_or_subdomain(seed_host: &str, candidate: &str) -> bool {
    let base = strip_www(seed_host);
    let candidate = strip_www(candidate);
    candidate == base || candidate.ends_with(&format!(".{}", base))
}

fn is_ip_literal(host: &str) -> bool {
    host.starts_with('[') || host.parse::<IpAddr>().is_ok()
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
