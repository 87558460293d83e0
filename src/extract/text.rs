//! Readable text extraction
//!
//! Semantic extraction alone comes back empty on many client-rendered pages,
//! whose content lives in bare `<div>`s. Extraction is therefore layered:
//! headings, paragraphs and list items first, then text-bearing generic
//! containers, and finally the whole content root flattened to one line.

use super::{collapse_whitespace, selector, ExtractError};
use scraper::{ElementRef, Html};
use std::collections::HashSet;

/// Elements removed before any text is collected
const NON_CONTENT: &str = "script, style, noscript, nav, footer, header, aside, iframe, svg, form";

/// Candidate content roots, most specific first
///
/// The first candidate that exists and carries text wins.
pub const CONTENT_ROOTS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#main-content",
    ".main-content",
    "#content",
    ".content",
    ".post-content",
    ".entry-content",
    ".article-body",
    "#main",
    // SPA mount points
    "#root",
    "#app",
    "#__next",
    "#__nuxt",
    "body",
];

const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";
const SEMANTIC: &str = "h1, h2, h3, h4, h5, h6, p, li";
const CONTAINERS: &str = "div, section";

/// Paragraphs this short are presumed to be UI chrome
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Generic containers shorter than this are skipped
const MIN_CONTAINER_CHARS: usize = 50;

const BULLET: &str = "• ";

/// Tags treated as block-level when deciding if a container is a pure wrapper
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Extracts readable text from a document
///
/// Non-content elements are detached from the document first, so the
/// document is modified in place.
pub fn extract_text(document: &mut Html) -> Result<String, ExtractError> {
    strip_non_content(document)?;

    let root = match choose_root(document)? {
        Some(root) => root,
        None => return Ok(String::new()),
    };

    let blocks = structured_blocks(root)?;
    if blocks.is_empty() {
        return Ok(collapse_whitespace(root.text()));
    }

    Ok(blocks.join("\n\n"))
}

/// Detaches script, style and page chrome from the tree
fn strip_non_content(document: &mut Html) -> Result<(), ExtractError> {
    let sel = selector(NON_CONTENT)?;
    let ids: Vec<_> = document.select(&sel).map(|el| el.id()).collect();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    Ok(())
}

/// Picks the element to extract text from
fn choose_root(document: &Html) -> Result<Option<ElementRef<'_>>, ExtractError> {
    for css in CONTENT_ROOTS {
        let sel = selector(css)?;
        let candidate = document
            .select(&sel)
            .find(|el| el.text().any(|t| !t.trim().is_empty()));

        if let Some(root) = candidate {
            return Ok(Some(root));
        }
    }

    let body = selector("body")?;
    Ok(document.select(&body).next())
}

/// Collects headings, paragraphs, list items and text-bearing containers
fn structured_blocks(root: ElementRef<'_>) -> Result<Vec<String>, ExtractError> {
    let mut blocks = Vec::new();
    let mut seen = HashSet::new();

    let mut push = |text: String| {
        if !text.is_empty() && seen.insert(text.clone()) {
            blocks.push(text);
        }
    };

    let headings = selector(HEADINGS)?;
    for el in root.select(&headings) {
        push(collapse_whitespace(el.text()));
    }

    let paragraphs = selector("p")?;
    for el in root.select(&paragraphs) {
        let text = collapse_whitespace(el.text());
        if text.chars().count() > MIN_PARAGRAPH_CHARS {
            push(text);
        }
    }

    let items = selector("li")?;
    for el in root.select(&items) {
        let text = collapse_whitespace(el.text());
        if !text.is_empty() {
            push(format!("{}{}", BULLET, text));
        }
    }

    let containers = selector(CONTAINERS)?;
    let semantic = selector(SEMANTIC)?;
    for el in root.select(&containers) {
        if is_text_container(el, &semantic) {
            push(collapse_whitespace(el.text()));
        }
    }

    Ok(blocks)
}

/// Returns true for a generic container whose own text is content
///
/// The container must have direct text, must not be a wrapper whose element
/// children are all blocks, must be long enough, and must not hold semantic
/// elements that were already captured.
fn is_text_container(el: ElementRef<'_>, semantic: &scraper::Selector) -> bool {
    let has_direct_text = el
        .children()
        .filter_map(|child| child.value().as_text())
        .any(|text| !text.trim().is_empty());
    if !has_direct_text {
        return false;
    }

    let child_tags: Vec<&str> = el
        .children()
        .filter_map(ElementRef::wrap)
        .map(|child| child.value().name())
        .collect();
    if !child_tags.is_empty() && child_tags.iter().all(|tag| BLOCK_TAGS.contains(tag)) {
        return false;
    }

    if collapse_whitespace(el.text()).chars().count() < MIN_CONTAINER_CHARS {
        return false;
    }

    el.select(semantic).next().is_none()
}
