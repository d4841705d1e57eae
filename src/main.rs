//! Site-Harvester main entry point
//!
//! This is the command-line interface for the Site-Harvester crawler.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use site_harvester::config::{load_config_with_hash, validate, Config};
use site_harvester::crawler::{run_crawl, validate_seed};
use site_harvester::extract::Section;
use site_harvester::output::{print_statistics, write_json_report};
use site_harvester::server;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Site-Harvester: a bounded same-site crawler
///
/// Site-Harvester crawls a website from a seed URL in breadth-first waves and
/// extracts structured content (titles, headings, paragraphs, tables, links,
/// images) from every page it visits.
#[derive(Parser, Debug)]
#[command(name = "site-harvester")]
#[command(version)]
#[command(about = "A bounded same-site crawler with structured extraction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site and print the extracted records as JSON
    Crawl(CrawlArgs),

    /// Run the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages to visit
    #[arg(long)]
    max_pages: Option<usize>,

    /// Link-following horizon (the seed is depth 1)
    #[arg(long)]
    depth: Option<u32>,

    /// Maximum number of links followed from each page
    #[arg(long)]
    links_per_page: Option<usize>,

    /// Field to extract (repeatable)
    #[arg(short, long = "section", value_enum, value_name = "SECTION")]
    sections: Vec<SectionArg>,

    /// Extract every field
    #[arg(long, conflicts_with = "sections")]
    all_sections: bool,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate config and seed, show the effective settings, and exit
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to bind, overriding `[server] bind`
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SectionArg {
    Title,
    #[value(alias = "meta")]
    MetaDescription,
    Headings,
    Paragraphs,
    Tables,
    Links,
    Images,
}

impl From<SectionArg> for Section {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::Title => Section::Title,
            SectionArg::MetaDescription => Section::MetaDescription,
            SectionArg::Headings => Section::Headings,
            SectionArg::Paragraphs => Section::Paragraphs,
            SectionArg::Tables => Section::Tables,
            SectionArg::Links => Section::Links,
            SectionArg::Images => Section::Images,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl(args) => handle_crawl(args, cli.quiet).await,
        Command::Serve(args) => handle_serve(args).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` is honored when no verbosity flag is given.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("site_harvester=info,warn")),
            1 => EnvFilter::new("site_harvester=debug,info"),
            2 => EnvFilter::new("site_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load_configuration(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None => {
            tracing::info!("No configuration file given, using defaults");
            return Ok(Config::default());
        }
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Applies command-line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, args: &CrawlArgs) {
    if let Some(max_pages) = args.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(depth) = args.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(links_per_page) = args.links_per_page {
        config.crawler.links_per_page = links_per_page;
    }

    if args.all_sections {
        config.sections = site_harvester::Sections::all();
    } else {
        for section in &args.sections {
            config.sections.enable((*section).into());
        }
    }
}

/// Handles the --dry-run mode: validates config and seed, shows the settings
fn handle_dry_run(config: &Config, seed: &str) -> Result<()> {
    validate_seed(seed).context("Seed URL rejected")?;

    println!("=== Site-Harvester Dry Run ===\n");

    println!("Seed: {}", seed);
    println!("Domain: {}", site_harvester::domain_of(seed));

    println!("\nCrawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Links per page: {}", config.crawler.links_per_page);
    println!("  Workers: {}", config.crawler.workers);

    println!("\nFetch:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Max retries: {}", config.fetch.max_retries);
    println!(
        "  Backoff: {}ms base, {}ms max",
        config.fetch.backoff_base_ms, config.fetch.backoff_max_ms
    );
    println!("  User agents: {}", config.fetch.user_agents.len());

    let sections = config.sections;
    let enabled: Vec<&str> = [
        ("title", sections.title),
        ("meta-description", sections.meta_description),
        ("headings", sections.headings),
        ("paragraphs", sections.paragraphs),
        ("tables", sections.tables),
        ("links", sections.links),
        ("images", sections.images),
    ]
    .iter()
    .filter(|(_, on)| *on)
    .map(|(name, _)| *name)
    .collect();

    println!("\nSections:");
    if enabled.is_empty() {
        println!("  (none, records will carry only the URL)");
    } else {
        println!("  {}", enabled.join(", "));
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the crawl command
async fn handle_crawl(args: CrawlArgs, quiet: bool) -> Result<()> {
    let mut config = load_configuration(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    validate(&config).context("Invalid configuration")?;

    if args.dry_run {
        return handle_dry_run(&config, &args.url);
    }

    if !config.sections.any() {
        tracing::warn!("No sections selected; records will carry only the page URL");
    }

    let report = match run_crawl(&args.url, &config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    write_json_report(&report, args.output.as_deref()).context("Failed to write report")?;
    if !quiet {
        print_statistics(&report.stats);
    }

    Ok(())
}

/// Handles the serve command
async fn handle_serve(args: ServeArgs) -> Result<()> {
    let mut config = load_configuration(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    validate(&config).context("Invalid configuration")?;

    server::serve(config).await?;
    Ok(())
}
