//! Job-Trawl main entry point
//!
//! This is the command-line interface for the Job-Trawl job-posting crawler.

use chrono::Local;
use clap::Parser;
use job_trawl::config::{load_config_with_hash, Config};
use job_trawl::crawler::{build_orchestrator, CrawlPlan};
use job_trawl::output::{generate_markdown_summary, print_report, RunSummary};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Job-Trawl: a polite multi-source job-posting crawler
///
/// Job-Trawl searches the configured job sites for every keyword, extracts
/// the individual postings and writes a run summary.
#[derive(Parser, Debug)]
#[command(name = "job-trawl")]
#[command(version)]
#[command(about = "A polite multi-source job-posting crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("job_trawl=info,warn"),
            1 => EnvFilter::new("job_trawl=debug,info"),
            2 => EnvFilter::new("job_trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn crawl_plan(config: &Config) -> Result<CrawlPlan, Box<dyn std::error::Error>> {
    Ok(CrawlPlan {
        keywords: config.keywords.keywords.clone(),
        location: config.keywords.location.clone(),
        skills: config.keywords.skills.clone(),
        limit: config.limit()?,
    })
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let plan = crawl_plan(config)?;
    let sources = config.sources()?;
    let scraping = &config.scraping;

    println!("=== Job-Trawl Dry Run ===\n");

    println!("Sources ({}):", sources.len());
    for source in &sources {
        let engine = if source.needs_browser() {
            "rendered"
        } else {
            "http"
        };
        println!("  - {} ({})", source, engine);
    }

    println!("\nSearch:");
    println!("  Keywords: {}", plan.keywords.join(", "));
    println!("  Location: {}", plan.location);
    if !plan.skills.is_empty() {
        println!("  Skills: {}", plan.skills.join(", "));
    }
    println!("  Limit per source and keyword: {}", plan.limit);

    println!("\nPacing:");
    println!("  Request delay: {:.1}s", scraping.request_delay_secs);
    println!("  Request timeout: {}s", scraping.request_timeout_secs);
    println!("  Render timeout: {}s", scraping.render_timeout_secs);
    println!("  Max pages per keyword: {}", scraping.max_pages_per_keyword);
    println!("  Concurrent sources: {}", scraping.max_concurrent_sources);
    match &scraping.webdriver_url {
        Some(url) => println!("  WebDriver: {}", url),
        None => println!("  WebDriver: not configured"),
    }

    println!("\nOutput:");
    println!("  Data directory: {}", config.paths.data_dir);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would run {} searches",
        sources.len() * plan.keywords.len()
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    let plan = crawl_plan(config)?;
    let cancel = CancellationToken::new();

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with the records collected so far");
            ctrl_c.cancel();
        }
    });

    let orchestrator = build_orchestrator(config, cancel)?;

    let started_at = Local::now();
    tracing::info!(
        "Crawling {} keywords on {} sources",
        plan.keywords.len(),
        orchestrator.sources().len()
    );
    let outcome = orchestrator.run(&plan).await;
    let summary = RunSummary::new(&outcome, &plan, config_hash, started_at, Local::now());

    print_report(&summary);

    let path = generate_markdown_summary(&summary, Path::new(&config.paths.data_dir))?;
    println!("\n✓ Summary written to: {}", path.display());

    Ok(())
}
