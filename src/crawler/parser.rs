//! Link extraction
//!
//! This module pulls the links a crawl may follow out of a page:
//! anchors only, resolved against the page URL, restricted to the page's own
//! host and deduplicated by normalized URL.

use crate::url::{normalize_url, same_host};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts same-host links from HTML
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - Fragment-only links (`#section`)
/// - `javascript:` links and any other non-HTTP(S) scheme (`mailto:`, `tel:`, `data:`)
/// - Links whose host differs from the base URL's host
/// - Hrefs that fail to resolve; a bad anchor is skipped, never fatal
///
/// # Returns
///
/// Normalized URLs in document order, without duplicates
///
/// # Example
///
/// ```
/// use siteglean::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/docs/">Docs</a><a href="https://other.com/">Other</a>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/docs");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);

    let a_selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(absolute_url) = resolve_link(href, base_url) else {
            continue;
        };

        if !same_host(&absolute_url, base_url) {
            continue;
        }

        let normalized = match normalize_url(absolute_url.as_str()) {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::trace!("Skipping link {}: {}", absolute_url, e);
                continue;
            }
        };

        if seen.insert(normalized.to_string()) {
            links.push(normalized);
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript: pseudo-links
/// - invalid URLs
/// - non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href
        .get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}
