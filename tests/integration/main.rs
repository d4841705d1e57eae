//! Integration tests for Site-Harvester
//!
//! These tests run real crawls and API requests against wiremock servers.

mod crawl_tests;
mod server_tests;

use rand::rngs::StdRng;
use rand::SeedableRng;
use site_harvester::config::{Config, CrawlerConfig};
use site_harvester::crawler::{Coordinator, Fetcher};
use site_harvester::Sections;
use std::sync::Arc;

/// Creates a test configuration with short retry delays and titles enabled
pub fn create_test_config(max_pages: usize, max_depth: u32, links_per_page: usize) -> Config {
    let mut config = Config::default();
    config.crawler = CrawlerConfig {
        max_pages,
        max_depth,
        links_per_page,
        workers: 5,
    };
    config.fetch.timeout_secs = 5;
    config.fetch.max_retries = 2;
    config.fetch.backoff_base_ms = 10;
    config.fetch.backoff_max_ms = 50;
    config.sections = Sections {
        title: true,
        ..Sections::default()
    };
    config
}

/// Builds a fetcher whose User-Agent rotation is deterministic
pub fn seeded_fetcher(config: &Config) -> Arc<Fetcher> {
    let fetcher = Fetcher::with_rng(&config.fetch, StdRng::seed_from_u64(42))
        .expect("Failed to build fetcher");
    Arc::new(fetcher)
}

pub fn create_coordinator(seed: &str, config: &Config) -> Coordinator {
    Coordinator::with_fetcher(seed, config, seeded_fetcher(config))
        .expect("Failed to create coordinator")
}

/// Wraps a body fragment in a minimal HTML page with a title
pub fn html_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}
