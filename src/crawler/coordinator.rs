//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the wave loop that coordinates every part of a
//! crawl run:
//! - Validating the seed before any request is made
//! - Claiming frontier entries up to the remaining page budget
//! - Running fetch, parse and extract for each entry on a bounded worker pool
//! - Folding records and discovered links back in once the wave drains

use crate::config::Config;
use crate::crawler::fetcher::{FetchFailure, Fetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::{extract_raw_links, ParseFailure, ParserChain};
use crate::extract::{ContentExtractor, PageRecord};
use crate::output::{CrawlReport, CrawlStatistics};
use crate::url::{canonical_url, domain_of, is_valid_url, normalize_url};
use crate::HarvestError;
use chrono::Utc;
use scraper::Html;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Result of running one frontier entry through the page pipeline
#[derive(Debug)]
pub enum PageOutcome {
    /// The page was fetched, parsed and extracted
    Processed {
        record: PageRecord,

        /// Same-domain links to follow, already capped to `links_per_page`
        links: Vec<String>,
    },

    FetchFailed(FetchFailure),

    ParseFailed(ParseFailure),
}

/// Fetch, parse and extract for a single page
///
/// Shared read-only by every worker of a run.
struct PagePipeline {
    fetcher: Arc<Fetcher>,
    parsers: ParserChain,
    extractor: ContentExtractor,
    seed_domain: String,
    max_depth: u32,
    links_per_page: usize,
}

impl PagePipeline {
    async fn process(&self, entry: &FrontierEntry) -> PageOutcome {
        tracing::debug!("Scraping {} (depth {})", entry.url, entry.depth);

        match self.fetcher.fetch(&entry.url).await {
            Ok(page) => {
                tracing::debug!("Fetched {} (HTTP {})", entry.url, page.status);
                if canonical_url(&page.final_url) != canonical_url(&entry.url) {
                    tracing::debug!("{} redirected to {}", entry.url, page.final_url);
                }
                self.digest(entry, &page.body)
            }
            Err(failure) => {
                tracing::warn!("Failed to fetch {}: {}", entry.url, failure);
                PageOutcome::FetchFailed(failure)
            }
        }
    }

    /// Parses and extracts a fetched body
    ///
    /// Kept synchronous: the parsed tree is not `Send` and must never live
    /// across an await point.
    fn digest(&self, entry: &FrontierEntry, body: &str) -> PageOutcome {
        let document = match self.parsers.parse(body) {
            Ok(document) => document,
            Err(failure) => {
                tracing::warn!("Failed to parse {}: {}", entry.url, failure);
                return PageOutcome::ParseFailed(failure);
            }
        };

        let record = self.extractor.extract(&document, &entry.url);
        let links = if entry.depth < self.max_depth {
            self.follow_links(&document, &entry.url)
        } else {
            Vec::new()
        };

        PageOutcome::Processed { record, links }
    }

    /// Selects the links worth following from a page
    ///
    /// Raw hrefs are normalized against the page URL and kept when they are
    /// valid http(s) URLs on the seed's domain. At most `links_per_page`
    /// distinct URLs are returned, in document order. Spellings of the same
    /// address count once.
    fn follow_links(&self, document: &Html, page_url: &str) -> Vec<String> {
        let mut seen = HashSet::new();

        extract_raw_links(document)
            .iter()
            .filter_map(|raw| normalize_url(page_url, raw))
            .filter(|url| is_valid_url(url) && domain_of(url) == self.seed_domain)
            .filter(|url| seen.insert(canonical_url(url)))
            .take(self.links_per_page)
            .collect()
    }
}

/// Main crawler coordinator structure
///
/// Owns the frontier for the duration of one run; [`Coordinator::run`]
/// consumes it so no crawl state outlives the run.
pub struct Coordinator {
    seed: String,
    frontier: Frontier,
    pipeline: Arc<PagePipeline>,
    max_pages: usize,
    workers: usize,
}

impl Coordinator {
    /// Creates a coordinator with a fetcher built from `config.fetch`
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute http(s) URL to start from
    /// * `config` - Crawl budget, fetch settings and field selection
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError::InvalidInput)` - The seed is not a valid URL
    /// * `Err(HarvestError::HttpClient)` - The HTTP client could not be built
    pub fn new(seed: &str, config: &Config) -> Result<Self, HarvestError> {
        validate_seed(seed)?;
        let fetcher = Fetcher::new(&config.fetch)?;
        Ok(Self::build(seed, config, Arc::new(fetcher)))
    }

    /// Creates a coordinator around an existing fetcher
    ///
    /// Lets callers share one client across runs or inject a fetcher with a
    /// seeded random source.
    pub fn with_fetcher(
        seed: &str,
        config: &Config,
        fetcher: Arc<Fetcher>,
    ) -> Result<Self, HarvestError> {
        validate_seed(seed)?;
        Ok(Self::build(seed, config, fetcher))
    }

    /// Assembles a coordinator for a seed that has already been validated
    fn build(seed: &str, config: &Config, fetcher: Arc<Fetcher>) -> Self {
        let seed = seed.trim();
        let crawler = &config.crawler;
        let pipeline = PagePipeline {
            fetcher,
            parsers: ParserChain::default(),
            extractor: ContentExtractor::new(config.sections),
            seed_domain: domain_of(seed),
            max_depth: crawler.max_depth,
            links_per_page: crawler.links_per_page,
        };

        Self {
            seed: seed.to_string(),
            frontier: Frontier::new(seed, crawler.max_depth),
            pipeline: Arc::new(pipeline),
            max_pages: crawler.max_pages,
            workers: crawler.workers.max(1),
        }
    }

    /// Runs the crawl to completion
    ///
    /// Waves repeat until the frontier is empty or the page budget is spent.
    /// Each wave claims at most `max_pages - visited` entries, so the number
    /// of visited pages never exceeds `max_pages`. Per-page failures are
    /// counted and skipped; they never abort the run.
    pub async fn run(mut self) -> Result<CrawlReport, HarvestError> {
        let started_at = Utc::now();
        let start_time = Instant::now();
        let mut stats = CrawlStatistics::default();
        let mut pages = Vec::new();

        tracing::info!(
            "Starting crawl of {} (max pages {}, max depth {}, {} workers)",
            self.seed,
            self.max_pages,
            self.pipeline.max_depth,
            self.workers
        );

        loop {
            let budget = self.max_pages.saturating_sub(self.frontier.visited_count());
            if budget == 0 {
                tracing::info!("Page budget of {} exhausted", self.max_pages);
                break;
            }

            let wave = self.frontier.next_wave(budget);
            if wave.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            }

            stats.waves += 1;
            tracing::info!("Wave {}: dispatching {} pages", stats.waves, wave.len());

            let completed = self.run_wave(wave, &mut stats).await;
            let mut scheduled = 0;

            for (entry, outcome) in completed {
                stats.deepest_depth = stats.deepest_depth.max(entry.depth);

                match outcome {
                    PageOutcome::Processed { record, links } => {
                        stats.pages_extracted += 1;
                        pages.push(record);

                        for link in links {
                            if self.frontier.schedule(link.as_str(), entry.depth + 1) {
                                tracing::debug!("Scheduled {} (depth {})", link, entry.depth + 1);
                                scheduled += 1;
                            }
                        }
                    }
                    PageOutcome::FetchFailed(_) => stats.fetch_failures += 1,
                    PageOutcome::ParseFailed(_) => stats.parse_failures += 1,
                }
            }

            stats.links_scheduled += scheduled;
            tracing::info!(
                "Wave {} finished: {} pages extracted so far, {} new links queued",
                stats.waves,
                pages.len(),
                scheduled
            );
        }

        stats.pages_visited = self.frontier.visited_count();
        stats.elapsed_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            "Crawl completed: {} of {} visited pages extracted in {:?}",
            stats.pages_extracted,
            stats.pages_visited,
            start_time.elapsed()
        );

        Ok(CrawlReport {
            seed: self.seed,
            started_at,
            finished_at: Utc::now(),
            stats,
            pages,
        })
    }

    /// Dispatches one wave and waits for every worker to finish
    ///
    /// Outcomes come back in the order the entries were claimed, regardless
    /// of completion order, so results are deterministic for a given site.
    async fn run_wave(
        &self,
        wave: Vec<FrontierEntry>,
        stats: &mut CrawlStatistics,
    ) -> Vec<(FrontierEntry, PageOutcome)> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        let wave_size = wave.len();

        for (index, entry) in wave.into_iter().enumerate() {
            let pipeline = Arc::clone(&self.pipeline);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring cannot fail
                let _permit = semaphore.acquire_owned().await;
                let outcome = pipeline.process(&entry).await;
                (index, entry, outcome)
            });
        }

        let mut completed = Vec::with_capacity(wave_size);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => completed.push(result),
                Err(e) => {
                    let error = HarvestError::Task(e.to_string());
                    tracing::error!("{}", error);
                    stats.task_failures += 1;
                }
            }
        }

        completed.sort_by_key(|(index, _, _)| *index);
        completed
            .into_iter()
            .map(|(_, entry, outcome)| (entry, outcome))
            .collect()
    }
}

/// Checks that `seed` is a non-empty absolute http(s) URL
///
/// # Returns
///
/// * `Ok(())` - The seed can be crawled
/// * `Err(HarvestError::InvalidInput)` - The seed is empty or not a valid URL
pub fn validate_seed(seed: &str) -> Result<(), HarvestError> {
    if seed.trim().is_empty() {
        return Err(HarvestError::InvalidInput("URL is required".to_string()));
    }
    if !is_valid_url(seed) {
        return Err(HarvestError::InvalidInput(format!(
            "Invalid URL: {}",
            seed
        )));
    }
    Ok(())
}

/// Runs a complete crawl from `seed` with the given configuration
///
/// Validates the seed, builds the HTTP client from `config.fetch`, then
/// crawls wave by wave until the frontier or the page budget runs out.
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(HarvestError::InvalidInput)` - The seed was rejected; nothing was fetched
///
/// # Example
///
/// ```no_run
/// use site_harvester::config::Config;
/// use site_harvester::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl("https://example.com/", &Config::default()).await?;
/// println!("{} pages", report.count());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(seed: &str, config: &Config) -> Result<CrawlReport, HarvestError> {
    Coordinator::new(seed, config)?.run().await
}
