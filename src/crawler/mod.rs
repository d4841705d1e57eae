//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with User-Agent rotation and retry logic
//! - HTML parsing with a strict-then-lenient fallback
//! - The frontier with its visited and scheduled sets
//! - Overall crawl coordination in waves

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{run_crawl, validate_seed, Coordinator, PageOutcome};
pub use fetcher::{
    ExponentialBackoff, FetchFailure, FetchedPage, Fetcher, UserAgentPool, RETRYABLE_STATUSES,
};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{
    extract_raw_links, parse_document, HtmlParser, LenientParser, ParseFailure, ParserChain,
    StrictParser, DEFAULT_MAX_PARSE_ERRORS,
};
