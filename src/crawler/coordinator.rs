//! Crawl coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first crawl loop:
//! - Managing the frontier queue and visited set
//! - Coordinating fetching, content extraction and link extraction
//! - Enforcing the page-count and depth bounds
//! - Racing the traversal against the crawl timeout

use crate::crawler::fetcher::{FetchedPage, PageFetcher};
use crate::crawler::frontier::{Frontier, VisitedSet};
use crate::crawler::parser::extract_links;
use crate::crawler::types::{CrawlRequest, CrawlResult, FrontierEntry, PageResult};
use crate::extract::{extract, ExtractedPage};
use crate::url::normalize_url;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Runs bounded crawls with a shared page fetcher
///
/// The crawler itself holds no per-crawl state; every call to `crawl` owns
/// its own frontier and visited set.
#[derive(Clone)]
pub struct Crawler {
    fetcher: PageFetcher,
}

/// Mutable state of one crawl
///
/// Kept outside the traversal future so that whatever has accumulated
/// survives when the timeout cancels the traversal.
struct CrawlState {
    frontier: Frontier,
    visited: VisitedSet,
    urls: Vec<String>,
    pages: Vec<PageResult>,
}

impl CrawlState {
    fn new(seed: &Url) -> Self {
        let mut frontier = Frontier::new();
        let key = normalize_url(seed.as_str())
            .map(|u| u.to_string())
            .unwrap_or_else(|_| seed.to_string());
        frontier.push(
            key,
            FrontierEntry {
                url: seed.clone(),
                depth: 0,
            },
        );

        Self {
            frontier,
            visited: VisitedSet::new(),
            urls: Vec::new(),
            pages: Vec::new(),
        }
    }
}

impl Crawler {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Crawls from the request's seed and returns what was gathered
    ///
    /// Only an invalid request is an error. Page failures are recorded by the
    /// page's URL appearing in `urls` without content, and a timeout returns
    /// the partial result with `timed_out` set.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use siteglean::config::Config;
    /// use siteglean::crawler::{CrawlRequest, Crawler, PageFetcher};
    ///
    /// # async fn example(fetcher: PageFetcher) -> Result<(), Box<dyn std::error::Error>> {
    /// let crawler = Crawler::new(fetcher);
    /// let request = CrawlRequest::new("https://example.com/")?.max_pages(5);
    /// let result = crawler.crawl(&request).await?;
    /// println!("Visited {} pages", result.urls.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(&self, request: &CrawlRequest) -> crate::Result<CrawlResult> {
        request.validate()?;

        tracing::info!(
            "Starting crawl of {} (max pages: {}, max depth: {}, js render: {})",
            request.seed,
            request.max_pages,
            request.max_depth,
            request.js_render
        );

        let start_time = Instant::now();
        let mut state = CrawlState::new(&request.seed);

        let timed_out = tokio::time::timeout(request.timeout, self.traverse(request, &mut state))
            .await
            .is_err();

        if timed_out {
            tracing::warn!(
                "Crawl of {} timed out after {:?}; returning {} visited pages",
                request.seed,
                request.timeout,
                state.urls.len()
            );
        } else {
            tracing::info!(
                "Crawl completed: {} pages visited, {} with content, in {:?}",
                state.urls.len(),
                state.pages.len(),
                start_time.elapsed()
            );
        }

        Ok(CrawlResult::from_pages(state.urls, state.pages, timed_out))
    }

    /// The breadth-first loop
    async fn traverse(&self, request: &CrawlRequest, state: &mut CrawlState) {
        while state.visited.len() < request.max_pages {
            let Some(entry) = state.frontier.pop() else {
                tracing::debug!("Frontier is empty, crawl complete");
                break;
            };

            let key = match normalize_url(entry.url.as_str()) {
                Ok(normalized) => normalized.to_string(),
                Err(e) => {
                    tracing::debug!("Skipping unreachable URL {}: {}", entry.url, e);
                    continue;
                }
            };

            if !state.visited.insert(key) {
                continue;
            }
            state.urls.push(entry.url.to_string());

            self.process_page(&entry, request, state).await;
        }
    }

    /// Fetches and extracts one page, queueing its links
    async fn process_page(&self, entry: &FrontierEntry, request: &CrawlRequest, state: &mut CrawlState) {
        tracing::debug!("Processing URL: {} (depth {})", entry.url, entry.depth);

        let page = match self
            .fetcher
            .fetch(&entry.url, request.js_render, request.settle_delay)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", entry.url, e);
                return;
            }
        };

        let (extracted, links) = extract_in_parallel(page, &entry.url).await;

        match extracted {
            Some(extracted) if !extracted.text.is_empty() => {
                state.pages.push(PageResult {
                    url: entry.url.to_string(),
                    text: extracted.text,
                    metadata: extracted.metadata,
                });
            }
            _ => tracing::debug!("No text extracted from {}", entry.url),
        }

        if entry.depth >= request.max_depth {
            return;
        }

        let mut queued = 0;
        for link in links {
            let key = link.to_string();
            if state.visited.contains(&key) {
                continue;
            }
            let next = FrontierEntry {
                url: link,
                depth: entry.depth + 1,
            };
            if state.frontier.push(key, next) {
                queued += 1;
            }
        }

        tracing::debug!(
            "Queued {} new links from {}, {} in frontier",
            queued,
            entry.url,
            state.frontier.len()
        );
    }
}

/// Runs content and link extraction side by side off the async threads
///
/// Extraction failures are absorbed here: a page that cannot be extracted
/// yields no content, and links that cannot be extracted yield none.
async fn extract_in_parallel(page: FetchedPage, url: &Url) -> (Option<ExtractedPage>, Vec<Url>) {
    let html: Arc<str> = Arc::from(page.html);
    let render_method = page.render_method;

    let content_task = {
        let html = Arc::clone(&html);
        let url = url.clone();
        tokio::task::spawn_blocking(move || extract(&html, &url, render_method))
    };
    let links_task = {
        let url = url.clone();
        tokio::task::spawn_blocking(move || extract_links(&html, &url))
    };

    let (content, links) = tokio::join!(content_task, links_task);

    let extracted = match content {
        Ok(Ok(extracted)) => Some(extracted),
        Ok(Err(e)) => {
            tracing::warn!("Failed to extract content from {}: {}", url, e);
            None
        }
        Err(e) => {
            tracing::warn!("Content extraction task for {} failed: {}", url, e);
            None
        }
    };

    let links = links.unwrap_or_else(|e| {
        tracing::warn!("Link extraction task for {} failed: {}", url, e);
        Vec::new()
    });

    (extracted, links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::{FetchError, Fetcher};
    use crate::GleanError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Serves canned pages; unknown URLs return 404
    struct SiteFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl Fetcher for SiteFetcher {
        async fn fetch(&self, url: &Url, _settle_delay: Duration) -> Result<String, FetchError> {
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn crawler(pages: &[(&str, &str)]) -> Crawler {
        let pages = pages
            .iter()
            .map(|(url, html)| (url.to_string(), html.to_string()))
            .collect();
        Crawler::new(PageFetcher::static_only(Arc::new(SiteFetcher { pages })))
    }

    fn request(seed: &str) -> CrawlRequest {
        CrawlRequest::new(seed).unwrap().js_render(false)
    }

    #[tokio::test]
    async fn test_single_page() {
        let crawler = crawler(&[(
            "https://example.test/",
            "<html><head><title>Home</title></head><body><h1>Welcome home</h1></body></html>",
        )]);

        let result = crawler.crawl(&request("https://example.test/")).await.unwrap();

        assert_eq!(result.urls, vec!["https://example.test/"]);
        assert_eq!(result.metadata.len(), 1);
        assert_eq!(result.metadata[0].title, "Home");
        assert_eq!(result.content, "=== https://example.test/ ===\nWelcome home");
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn test_breadth_first_order() {
        let crawler = crawler(&[
            (
                "https://example.test/",
                r#"<h1>Root</h1><a href="/a">A</a><a href="/b">B</a>"#,
            ),
            ("https://example.test/a", r#"<h1>A</h1><a href="/a/deep">Deep</a>"#),
            ("https://example.test/b", "<h1>B</h1>"),
            ("https://example.test/a/deep", "<h1>Deep</h1>"),
        ]);

        let result = crawler.crawl(&request("https://example.test/")).await.unwrap();

        assert_eq!(
            result.urls,
            vec![
                "https://example.test/",
                "https://example.test/a",
                "https://example.test/b",
                "https://example.test/a/deep",
            ]
        );
    }

    #[tokio::test]
    async fn test_depth_zero_visits_only_seed() {
        let crawler = crawler(&[
            ("https://example.test/", r#"<h1>Root</h1><a href="/a">A</a>"#),
            ("https://example.test/a", "<h1>A</h1>"),
        ]);

        let result = crawler
            .crawl(&request("https://example.test/").max_depth(0))
            .await
            .unwrap();

        assert_eq!(result.urls, vec!["https://example.test/"]);
    }

    #[tokio::test]
    async fn test_empty_text_page_visited_without_content() {
        let crawler = crawler(&[
            ("https://example.test/", r#"<body><a href="/a"></a></body>"#),
            ("https://example.test/a", "<h1>A page</h1>"),
        ]);

        let result = crawler.crawl(&request("https://example.test/")).await.unwrap();

        assert_eq!(result.urls.len(), 2);
        assert_eq!(result.metadata.len(), 1);
        assert_eq!(result.metadata[0].url, "https://example.test/a");
    }

    #[tokio::test]
    async fn test_self_links_not_revisited() {
        let crawler = crawler(&[(
            "https://example.test/",
            r#"<h1>Root</h1><a href="/">Home</a><a href="/#top">Top</a><a href="/?ref=nav">Nav</a>"#,
        )]);

        let result = crawler.crawl(&request("https://example.test/")).await.unwrap();

        assert_eq!(result.urls, vec!["https://example.test/"]);
    }

    /// Answers every URL with the same HTTP error status
    struct ErrorStatusFetcher(u16);

    #[async_trait]
    impl Fetcher for ErrorStatusFetcher {
        async fn fetch(&self, url: &Url, _settle_delay: Duration) -> Result<String, FetchError> {
            Err(FetchError::Status {
                url: url.to_string(),
                status: self.0,
            })
        }
    }

    #[tokio::test]
    async fn test_rendered_seed_error_status_yields_empty_result() {
        let crawler = Crawler::new(PageFetcher::new(
            Arc::new(ErrorStatusFetcher(500)),
            Arc::new(ErrorStatusFetcher(500)),
        ));
        let request = CrawlRequest::new("https://example.test/")
            .unwrap()
            .js_render(true)
            .settle_delay(Duration::ZERO);

        let result = crawler.crawl(&request).await.unwrap();

        assert_eq!(result.urls, vec!["https://example.test/"]);
        assert_eq!(result.content, "");
        assert!(result.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let crawler = crawler(&[]);
        let result = crawler
            .crawl(&request("https://example.test/").max_pages(0))
            .await;
        assert!(matches!(result, Err(GleanError::Config(_))));
    }
}
