//! Content extraction for fetched pages
//!
//! Turns raw HTML into the readable text and page metadata that make up a
//! crawl result. Extraction is heuristic and tuned to cope with both static
//! HTML and the markup produced by client-side frameworks.

mod framework;
mod metadata;
mod text;

pub use framework::{detect_framework, Framework, FRAMEWORK_MARKERS};
pub use metadata::{extract_metadata, PageMetadata, RenderMethod};
pub use text::{extract_text, CONTENT_ROOTS};

use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors raised while extracting content from a page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Text and metadata extracted from one page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub text: String,
    pub metadata: PageMetadata,
}

/// Extracts readable text and metadata from raw HTML
///
/// # Arguments
///
/// * `html` - The raw (or browser-rendered) HTML
/// * `url` - The page URL, used to resolve the favicon and as the site name fallback
/// * `render_method` - How the HTML was obtained
///
/// # Returns
///
/// * `Ok(ExtractedPage)` - Text (possibly empty) and metadata
/// * `Err(ExtractError)` - A built-in selector failed to compile
///
/// # Example
///
/// ```
/// use siteglean::extract::{extract, RenderMethod};
/// use url::Url;
///
/// let html = "<html><head><title>Docs</title></head><body><main><h1>Welcome</h1></main></body></html>";
/// let url = Url::parse("https://example.com/").unwrap();
/// let page = extract(html, &url, RenderMethod::Static).unwrap();
/// assert_eq!(page.metadata.title, "Docs");
/// assert_eq!(page.text, "Welcome");
/// ```
pub fn extract(
    html: &str,
    url: &Url,
    render_method: RenderMethod,
) -> Result<ExtractedPage, ExtractError> {
    let mut document = Html::parse_document(html);

    let metadata = extract_metadata(&document, html, url, render_method)?;
    let text = extract_text(&mut document)?;

    Ok(ExtractedPage { text, metadata })
}

/// Parses a CSS selector, mapping failures to `ExtractError`
pub(crate) fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub(crate) fn collapse_whitespace<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for piece in pieces {
        for word in piece.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
    }
    out
}
