use crate::extract::Sections;
use serde::{Deserialize, Serialize};

/// Default browser User-Agent strings rotated across requests
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Main configuration structure for Site-Harvester
///
/// Every table is optional; missing keys fall back to the documented
/// defaults so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    pub sections: Sections,
    pub server: ServerConfig,
}

/// Crawl budget configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of pages dispatched for fetching
    pub max_pages: usize,

    /// Link-following horizon; the seed sits at depth 1
    pub max_depth: u32,

    /// Maximum number of same-domain links followed from one page
    pub links_per_page: usize,

    /// Number of concurrent fetch/parse/extract workers per wave
    pub workers: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 5,
            max_depth: 2,
            links_per_page: 5,
            workers: 5,
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Retries allowed for transient statuses (429, 500, 502, 503, 504)
    pub max_retries: u32,

    /// Delay before the first retry, doubled for every following retry
    pub backoff_base_ms: u64,

    /// Upper bound for a single retry delay
    pub backoff_max_ms: u64,

    /// Pool of User-Agent strings, one picked at random per request
    pub user_agents: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 3,
            backoff_base_ms: 1000,
            backoff_max_ms: 30_000,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Socket address the `serve` command binds to
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}
