//! Client-side framework detection
//!
//! A best-effort scan of the raw HTML for markers left behind by
//! client-rendered frameworks. Markers are checked in table order and the
//! first hit names the framework; add new markers to the table, not to the
//! extraction code.

use serde::Serialize;

/// Marker substring and the framework it indicates, checked in order
pub const FRAMEWORK_MARKERS: &[(&str, &str)] = &[
    ("__NEXT_DATA__", "Next.js"),
    ("id=\"__next\"", "Next.js"),
    ("__NUXT__", "Nuxt"),
    ("id=\"__nuxt\"", "Nuxt"),
    ("__remixContext", "Remix"),
    ("___gatsby", "Gatsby"),
    ("__sveltekit", "SvelteKit"),
    ("data-svelte", "Svelte"),
    ("ng-version", "Angular"),
    ("ng-app", "Angular"),
    ("data-reactroot", "React"),
    ("data-reactid", "React"),
    ("id=\"root\"", "React"),
    ("data-server-rendered", "Vue"),
    ("data-v-app", "Vue"),
    ("id=\"app\"", "Vue"),
    ("window.__INITIAL_STATE__", "SPA"),
];

/// Rendering technology detected for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    /// Markup carries client-side framework markers
    JsFramework,
    /// Plain server-rendered HTML
    StaticHtml,
}

impl Framework {
    /// Classifies raw HTML using the marker table
    pub fn from_html(html: &str) -> Self {
        if detect_framework(html).is_some() {
            Self::JsFramework
        } else {
            Self::StaticHtml
        }
    }
}

/// Returns the name of the first framework whose marker appears in the HTML
pub fn detect_framework(html: &str) -> Option<&'static str> {
    FRAMEWORK_MARKERS
        .iter()
        .find(|(marker, _)| html.contains(marker))
        .map(|(_, name)| *name)
}
