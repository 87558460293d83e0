use crate::UrlError;
use url::Url;

/// Tracking query parameters removed during normalization
pub const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "ref",
    "fbclid",
    "gclid",
];

/// Parses an absolute HTTP(S) URL without normalizing it
///
/// Seeds are crawled as given; only the dedup key is normalized.
///
/// # Arguments
///
/// * `url_str` - The seed URL as supplied by the caller
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL, unchanged
/// * `Err(UrlError)` - Malformed, not HTTP(S), or missing a host
pub fn parse_seed(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Normalizes a URL into the crawl's dedup key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Remove fragment (everything after #)
/// 3. Remove trailing slashes from the path (the root `/` is kept)
/// 4. Remove tracking query parameters, keeping the others in order
/// 5. Remove empty query string (trailing ?)
///
/// Host case is already folded by the URL parser. Applying the function to
/// its own output returns the same URL.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse the URL or it is not HTTP(S)
///
/// # Examples
///
/// ```
/// use siteglean::url::normalize_url;
///
/// let url = normalize_url("https://example.com/page/?utm_source=x#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = parse_seed(url_str)?;

    url.set_fragment(None);

    let path = url.path();
    let trimmed = path.trim_end_matches('/');
    if trimmed.len() != path.len() {
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
        url.set_path(&trimmed);
    }

    if let Some(query) = url.query() {
        if query.is_empty() {
            url.set_query(None);
        } else if url.query_pairs().any(|(key, _)| is_tracking_param(&key)) {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(key, _)| !is_tracking_param(key))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

            if kept.is_empty() {
                url.set_query(None);
            } else {
                url.query_pairs_mut().clear().extend_pairs(kept);
            }
        }
    }

    Ok(url)
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key)
}
