//! Site-Harvester: a bounded same-site crawler with structured extraction
//!
//! This crate crawls a website from a seed address in breadth-first waves,
//! extracts structured content (title, headings, paragraphs, tables, links,
//! images) from every page it visits, and returns the aggregated records.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod server;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The seed address is missing or is not an absolute http(s) URL.
    /// Reported before any page is fetched.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Worker task failed: {0}")]
    Task(String),
}

impl HarvestError {
    /// Returns true if the error was caused by the caller's input rather than
    /// by an internal failure
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),
}

/// Result type alias for Site-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, Fetcher};
pub use extract::{ContentExtractor, PageRecord, Sections};
pub use output::{CrawlReport, CrawlStatistics};
pub use crate::url::{domain_of, is_valid_url, normalize_url};
