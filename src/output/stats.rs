//! Crawl statistics collected by the coordinator
//!
//! This module provides the counters folded in after every wave and a
//! human-readable printer for them.

use serde::{Deserialize, Serialize};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStatistics {
    /// Number of waves dispatched
    pub waves: u32,

    /// URLs claimed for fetching, successful or not
    pub pages_visited: usize,

    /// Pages that produced a record
    pub pages_extracted: usize,

    /// Pages skipped because the fetch failed
    pub fetch_failures: usize,

    /// Pages skipped because no parser accepted the body
    pub parse_failures: usize,

    /// Worker tasks that panicked or were cancelled
    pub task_failures: usize,

    /// Discovered links added to the frontier
    pub links_scheduled: usize,

    /// Deepest depth that was dispatched
    pub deepest_depth: u32,

    /// Wall-clock duration of the run in milliseconds
    pub elapsed_ms: u64,
}

impl CrawlStatistics {
    /// Percentage of visited pages that produced a record
    pub fn success_rate(&self) -> f64 {
        if self.pages_visited == 0 {
            return 0.0;
        }
        (self.pages_extracted as f64 / self.pages_visited as f64) * 100.0
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// Stdout is left to the JSON report.
pub fn print_statistics(stats: &CrawlStatistics) {
    eprintln!("=== Crawl Statistics ===\n");

    eprintln!("Overview:");
    eprintln!("  Waves: {}", stats.waves);
    eprintln!("  Pages visited: {}", stats.pages_visited);
    eprintln!("  Pages extracted: {}", stats.pages_extracted);
    eprintln!("  Links scheduled: {}", stats.links_scheduled);
    eprintln!("  Deepest depth: {}", stats.deepest_depth);
    eprintln!("  Elapsed: {:.2}s", stats.elapsed_ms as f64 / 1000.0);
    eprintln!();

    let failures = stats.fetch_failures + stats.parse_failures + stats.task_failures;
    if failures > 0 {
        eprintln!("Failures:");
        eprintln!("  Fetch: {}", stats.fetch_failures);
        eprintln!("  Parse: {}", stats.parse_failures);
        if stats.task_failures > 0 {
            eprintln!("  Task: {}", stats.task_failures);
        }
        eprintln!();
    }

    eprintln!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        stats.success_rate(),
        stats.pages_extracted,
        stats.pages_visited
    );
}
