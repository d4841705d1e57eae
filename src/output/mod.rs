//! Output module for crawl reports
//!
//! This module handles:
//! - The report returned by a completed crawl run
//! - Exporting it as pretty-printed JSON
//! - Recording crawl statistics

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics};

use crate::extract::PageRecord;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Everything a crawl run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    /// The seed address the run started from
    pub seed: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    pub stats: CrawlStatistics,

    /// One record per successfully processed page, in dispatch order
    pub pages: Vec<PageRecord>,
}

impl CrawlReport {
    /// Number of page records in the report
    pub fn count(&self) -> usize {
        self.pages.len()
    }
}

/// Writes the report as pretty JSON
///
/// # Arguments
///
/// * `report` - The report to export
/// * `path` - Destination file; `None` writes to stdout
///
/// # Returns
///
/// * `Ok(())` - Report written
/// * `Err(HarvestError)` - Serialization or IO failure
pub fn write_json_report(report: &CrawlReport, path: Option<&Path>) -> Result<(), HarvestError> {
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_report(report, &mut writer)?;
            tracing::info!("Wrote {} page records to {}", report.count(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_report(report, &mut writer)?;
        }
    }

    Ok(())
}

fn write_report<W: Write>(report: &CrawlReport, writer: &mut W) -> Result<(), HarvestError> {
    serde_json::to_writer_pretty(&mut *writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
