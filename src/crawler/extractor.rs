//! Link extractor
//!
//! Parses a decoded page and produces the set of candidate URLs to push
//! back into the frontier: every `<a href>` target, resolved against the
//! crawl domain (implicit scheme `http`, implicit host the domain),
//! minus script-execution pseudo-schemes and off-domain hosts.

use crate::url::resolve_candidate;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Schemes that execute rather than locate; never followed
const PSEUDO_SCHEMES: &[&str] = &["javascript", "data", "vbscript"];

/// Extracts in-domain hyperlinks from a decoded HTML page
///
/// The output set has no guaranteed order. The caller performs the
/// advisory visited check and pushes survivors into the frontier;
/// deduplication proper happens at claim time, not here.
///
/// Malformed pages or hrefs degrade to "no links extracted" — extraction
/// is never fatal to the worker loop.
///
/// # Examples
///
/// ```
/// use kumo_swarm::crawler::extract_links;
///
/// let html = r#"<html><body><a href="/a">A</a></body></html>"#;
/// let links = extract_links(html, "domain");
/// assert!(links.contains("http://domain/a"));
/// ```
pub fn extract_links(html: &str, domain: &str) -> HashSet<String> {
    let document = Html::parse_document(html);
    let mut links = HashSet::new();

    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return links,
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_candidate(href, domain) else {
            continue;
        };

        if PSEUDO_SCHEMES.contains(&url.scheme()) {
            continue;
        }
        if url.host_str() != Some(domain) {
            continue;
        }

        links.insert(url.to_string());
    }

    links
}
