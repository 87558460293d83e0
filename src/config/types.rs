use crate::ConfigError;
use serde::Deserialize;

/// Browser-like User-Agent sent by both fetch strategies
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure for Siteglean
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub browser: BrowserConfig,
    pub cache: CacheConfig,
}

/// Defaults applied to crawl requests that leave a field unset
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of pages visited per crawl
    pub max_pages: usize,

    /// Maximum link depth from the seed
    pub max_depth: usize,

    /// Wall-clock budget for the whole crawl (milliseconds)
    pub timeout_ms: u64,

    /// Render pages in a headless browser before falling back to plain HTTP
    pub js_render: bool,

    /// Wait after page load before reading the rendered DOM (milliseconds)
    pub settle_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            max_depth: 2,
            timeout_ms: 60_000,
            js_render: true,
            settle_delay_ms: 3_000,
        }
    }
}

/// Static HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    pub user_agent: String,

    pub accept_language: String,

    /// Per-request timeout (milliseconds)
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    /// Upper bound for a single navigation (milliseconds)
    pub navigation_timeout_ms: u64,

    pub viewport_width: u32,

    pub viewport_height: u32,

    /// Path to a Chrome/Chromium binary; auto-detected when unset
    pub executable: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            viewport_width: 1920,
            viewport_height: 1080,
            executable: None,
        }
    }
}

/// Result cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    pub enabled: bool,

    /// Entry lifetime measured from write time (seconds)
    pub ttl_secs: u64,
}

/// Largest accepted `ttl-secs`; longer lifetimes cannot be represented
pub const MAX_TTL_SECS: u64 = i64::MAX as u64 / 1000;

impl CacheConfig {
    /// Entry lifetime as a duration
    ///
    /// # Returns
    ///
    /// * `Ok(Duration)` - The configured TTL
    /// * `Err(ConfigError)` - `ttl-secs` is too large to represent
    pub fn ttl(&self) -> Result<chrono::Duration, ConfigError> {
        i64::try_from(self.ttl_secs)
            .ok()
            .filter(|_| self.ttl_secs <= MAX_TTL_SECS)
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "ttl_secs must be <= {}, got {}",
                    MAX_TTL_SECS, self.ttl_secs
                ))
            })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 24 * 60 * 60,
        }
    }
}
