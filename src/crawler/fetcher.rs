//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured timeout
//! - Rotating browser-like User-Agent strings per request
//! - Retrying transient statuses with exponential backoff
//! - Error classification

use crate::config::{FetchConfig, DEFAULT_USER_AGENTS};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT,
};
use reqwest::{Client, StatusCode};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Statuses that are retried before the fetch is given up
pub const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,

    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Page body content
    pub body: String,
}

/// Why a page could not be fetched
///
/// A failure carries no partial data; callers treat the page as unavailable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    /// A non-success status outside the retryable set
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// A retryable status persisted through every attempt
    #[error("HTTP {status} after {attempts} attempts")]
    RetriesExhausted { status: u16, attempts: u32 },

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl FetchFailure {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

/// Pool of User-Agent strings with an injected random source
///
/// Production code seeds the generator from entropy; tests pass a seeded
/// [`StdRng`] so the rotation is reproducible.
pub struct UserAgentPool {
    agents: Vec<String>,
    rng: Mutex<StdRng>,
}

impl UserAgentPool {
    pub fn new(agents: Vec<String>, rng: StdRng) -> Self {
        Self {
            agents,
            rng: Mutex::new(rng),
        }
    }

    pub fn from_entropy(agents: Vec<String>) -> Self {
        Self::new(agents, StdRng::from_entropy())
    }

    /// Picks the User-Agent for the next request
    pub fn pick(&self) -> &str {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let agent = self
            .agents
            .choose(&mut *rng)
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0]);
        agent
    }
}

/// Exponential backoff between retries
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    base_ms: u64,
    max_ms: u64,
}

impl ExponentialBackoff {
    pub const fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// Delay before retry number `attempt + 1`: `base * 2^attempt`, capped
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponential_delay = self
            .base_ms
            .saturating_mul(2u64.saturating_pow(attempt.min(20)));
        Duration::from_millis(exponential_delay.min(self.max_ms))
    }
}

/// Issues GET requests with browser-like headers and transient-error retries
pub struct Fetcher {
    client: Client,
    agents: UserAgentPool,
    backoff: ExponentialBackoff,
    max_retries: u32,
}

impl Fetcher {
    /// Builds a fetcher whose User-Agent rotation is seeded from entropy
    ///
    /// # Example
    ///
    /// ```no_run
    /// use site_harvester::config::FetchConfig;
    /// use site_harvester::crawler::Fetcher;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let fetcher = Fetcher::new(&FetchConfig::default())?;
    /// let page = fetcher.fetch("https://example.com/").await?;
    /// println!("{} bytes", page.body.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Builds a fetcher with an explicit random source for User-Agent rotation
    pub fn with_rng(config: &FetchConfig, rng: StdRng) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            agents: UserAgentPool::new(config.user_agents.clone(), rng),
            backoff: ExponentialBackoff::new(config.backoff_base_ms, config.backoff_max_ms),
            max_retries: config.max_retries,
        })
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 429, 500, 502, 503, 504 | Retry up to `max_retries` times with exponential backoff |
    /// | Other HTTP 4xx/5xx | Immediate → `Status` |
    /// | Timeout | Immediate → `Timeout` |
    /// | Connection refused / DNS | Immediate → `Connect` |
    ///
    /// Redirects are followed by the client.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchFailure> {
        let mut attempt: u32 = 0;

        loop {
            let response = self
                .client
                .get(url)
                .headers(self.request_headers())
                .send()
                .await
                .map_err(FetchFailure::from_reqwest)?;

            let status = response.status();

            if !(status.is_client_error() || status.is_server_error()) {
                let final_url = response.url().to_string();
                let body = response
                    .text()
                    .await
                    .map_err(|e| FetchFailure::Body(e.to_string()))?;

                return Ok(FetchedPage {
                    url: url.to_string(),
                    final_url,
                    status: status.as_u16(),
                    body,
                });
            }

            if !is_retryable(status) {
                return Err(FetchFailure::Status {
                    status: status.as_u16(),
                });
            }

            if attempt >= self.max_retries {
                return Err(FetchFailure::RetriesExhausted {
                    status: status.as_u16(),
                    attempts: attempt + 1,
                });
            }

            let delay = self.backoff.delay(attempt);
            tracing::warn!(
                "HTTP {} from {}, retrying in {:?} (retry {}/{})",
                status.as_u16(),
                url,
                delay,
                attempt + 1,
                self.max_retries
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Headers sent with every request; the User-Agent changes per call
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        match HeaderValue::from_str(self.agents.pick()) {
            Ok(agent) => {
                headers.insert(USER_AGENT, agent);
            }
            Err(_) => {
                headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENTS[0]));
            }
        }
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        headers
    }
}

fn is_retryable(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status.as_u16())
}
