//! Page metadata extraction: title, description, site name, favicon

use super::framework::Framework;
use super::{collapse_whitespace, selector, ExtractError};
use crate::url::extract_domain;
use chrono::{DateTime, Utc};
use scraper::Html;
use serde::Serialize;
use url::Url;

/// How a page's HTML was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RenderMethod {
    /// Rendered in a headless browser
    #[serde(rename = "puppeteer")]
    Rendered,
    /// Plain HTTP GET
    #[serde(rename = "static")]
    Static,
}

/// Metadata describing one crawled page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    /// The page URL
    pub url: String,

    /// Text of the `<title>` tag (empty if absent)
    pub title: String,

    /// `<meta name="description">` or `og:description` (empty if absent)
    pub description: String,

    /// `og:site_name`, falling back to the hostname
    pub site_name: String,

    /// Absolute favicon URL
    pub favicon: String,

    pub framework: Framework,

    pub render_method: RenderMethod,

    pub crawled_at: DateTime<Utc>,
}

/// Extracts page metadata from a parsed document
///
/// `raw_html` is scanned for framework markers; it must be the text the
/// document was parsed from.
pub fn extract_metadata(
    document: &Html,
    raw_html: &str,
    url: &Url,
    render_method: RenderMethod,
) -> Result<PageMetadata, ExtractError> {
    let title = first_text(document, "title")?
        .or(meta_content(document, "meta[property='og:title']")?)
        .unwrap_or_default();

    let description = meta_content(document, "meta[name='description']")?
        .or(meta_content(document, "meta[property='og:description']")?)
        .unwrap_or_default();

    let site_name = meta_content(document, "meta[property='og:site_name']")?
        .or_else(|| extract_domain(url))
        .unwrap_or_default();

    let favicon = extract_favicon(document, url)?;

    Ok(PageMetadata {
        url: url.to_string(),
        title,
        description,
        site_name,
        favicon,
        framework: Framework::from_html(raw_html),
        render_method,
        crawled_at: Utc::now(),
    })
}

/// Resolves the page icon to an absolute URL
///
/// Icon links are tried in order; without one, browsers request
/// `/favicon.ico` from the page's origin, so that is what we report.
fn extract_favicon(document: &Html, url: &Url) -> Result<String, ExtractError> {
    for css in [
        "link[rel~='icon'][href]",
        "link[rel='apple-touch-icon'][href]",
    ] {
        let sel = selector(css)?;
        let resolved = document
            .select(&sel)
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .find_map(|href| url.join(href).ok());

        if let Some(icon) = resolved {
            return Ok(icon.to_string());
        }
    }

    Ok(url
        .join("/favicon.ico")
        .map(|u| u.to_string())
        .unwrap_or_default())
}

/// Returns the collapsed text of the first element matching `css`
fn first_text(document: &Html, css: &str) -> Result<Option<String>, ExtractError> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .map(|el| collapse_whitespace(el.text()))
        .filter(|s| !s.is_empty()))
}

/// Returns the trimmed `content` attribute of the first matching meta tag
fn meta_content(document: &Html, css: &str) -> Result<Option<String>, ExtractError> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string))
}
