//! URL handling module for Kumo-Swarm
//!
//! Provides the canonical URL form used throughout the frontier and
//! visited set (scheme, host, path, query — never a fragment) and the
//! href resolution used by the link extractor.

mod normalize;

pub use normalize::{normalize_url, resolve_candidate};

/// Extracts the host from a URL string, if it has one
pub fn extract_host(url_str: &str) -> Option<String> {
    url::Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}
