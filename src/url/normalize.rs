use crate::UrlError;
use url::Url;

/// Normalizes a URL into the crate's canonical form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject schemes other than http/https
/// 3. Require a host (the `url` crate lowercases it during parsing)
/// 4. Remove the fragment (everything after #)
/// 5. Keep path and query untouched
///
/// Equality of normalized URLs is exact string equality.
///
/// # Examples
///
/// ```
/// use kumo_swarm::url::normalize_url;
///
/// let url = normalize_url("http://Example.com/page?x=1#section").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page?x=1");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Resolves a raw href against the crawl domain
///
/// Relative references get the implicit scheme `http` and the target
/// domain as host, matching how the frontier records URLs. Absolute
/// references keep their own scheme and host. Fragments are dropped.
///
/// Returns `None` for hrefs that cannot be resolved at all (empty, or
/// malformed beyond what relative resolution can fix). Scheme and host
/// filtering is the caller's concern.
pub fn resolve_candidate(href: &str, domain: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let base = Url::parse(&format!("http://{}/", domain)).ok()?;
    let mut url = Url::options().base_url(Some(&base)).parse(href).ok()?;
    url.set_fragment(None);
    Some(url)
}
