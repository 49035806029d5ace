//! Deep-Crawl main entry point
//!
//! This is the command-line interface for the Deep-Crawl engine.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use deep_crawl::config::{load_config_with_hash, Config, FilterConfig, LimitValue};
use deep_crawl::output::{generate_markdown_summary, print_statistics, CrawlStatistics, RunInfo};
use deep_crawl::{normalize_url, CrawlOutput, CrawlResult, HttpFetcher};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Deep-Crawl: breadth-first, depth-first and best-first web crawling
///
/// Crawls outward from a start URL under the budgets, filters and scorer
/// given in a TOML configuration file, printing one line per visited page.
#[derive(Parser, Debug)]
#[command(name = "deep-crawl")]
#[command(version)]
#[command(about = "A deep-crawl orchestration engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URL the crawl starts from
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the crawl plan without crawling
    #[arg(long)]
    dry_run: bool,

    /// Write a markdown summary of the run to this path
    #[arg(long, value_name = "PATH", conflicts_with = "dry_run")]
    summary: Option<PathBuf>,

    /// Print results as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let start_url = normalize_url(&cli.start_url)
        .with_context(|| format!("Invalid start URL '{}'", cli.start_url))?;

    if cli.dry_run {
        handle_dry_run(&config, start_url.as_str());
        return Ok(());
    }

    handle_crawl(config, config_hash, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only results.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("deep_crawl=info,warn"),
            1 => EnvFilter::new("deep_crawl=debug,info"),
            2 => EnvFilter::new("deep_crawl=trace,debug"),
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

/// Handles the --dry-run mode: shows the validated crawl plan
fn handle_dry_run(config: &Config, start_url: &str) {
    let crawl = &config.crawl;

    println!("=== Deep-Crawl Dry Run ===\n");

    println!("Start URL: {}\n", start_url);

    println!("Crawl Configuration:");
    println!("  Strategy: {}", crawl.strategy);
    match &crawl.max_depth {
        Some(depth) => println!("  Max depth: {}", describe_limit(depth, "max-depth")),
        None => println!(
            "  Max depth: {} (strategy default)",
            crawl.strategy.default_max_depth()
        ),
    }
    match &crawl.max_pages {
        Some(pages) => println!("  Max pages: {}", describe_limit(pages, "max-pages")),
        None => println!("  Max pages: unbounded"),
    }
    println!("  Include external: {}", crawl.include_external);
    println!("  Concurrency: {}", crawl.concurrency);
    println!("  Batch size: {}", crawl.batch_size);
    println!("  Delivery: {:?}", crawl.delivery);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);

    println!("\nFilters ({}):", config.filters.len());
    for filter in &config.filters {
        println!("  - {}", describe_filter(filter));
    }

    match &config.scorer {
        Some(scorer) => println!("\nScorer: {:?}", scorer),
        None => println!("\nScorer: none (all links score 0.0)"),
    }

    println!("\n✓ Configuration is valid");
}

fn describe_limit(limit: &LimitValue, field: &str) -> String {
    limit
        .to_limit(field)
        .map(|limit| limit.to_string())
        .unwrap_or_else(|e| e.to_string())
}

fn describe_filter(filter: &FilterConfig) -> String {
    match filter {
        FilterConfig::UrlPattern { patterns, mode, .. } => {
            format!("url-pattern ({:?}): {}", mode, patterns.join(", "))
        }
        FilterConfig::Domain {
            allowed, blocked, ..
        } => format!(
            "domain: allow [{}], block [{}]",
            allowed.join(", "),
            blocked.join(", ")
        ),
        FilterConfig::ContentType { types, mode } => {
            format!("content-type ({:?}): {}", mode, types.join(", "))
        }
        FilterConfig::ExactUrl { urls, mode } => {
            format!("exact-url ({:?}): {} URLs", mode, urls.len())
        }
        FilterConfig::Relevance {
            keywords,
            threshold,
        } => format!(
            "relevance >= {}: {}",
            threshold,
            keywords.join(", ")
        ),
        FilterConfig::Seo {
            min_title_length, ..
        } => format!("seo (min title length {})", min_title_length),
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String, cli: &Cli) -> anyhow::Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(&config.http).context("Failed to build HTTP client")?);
    let crawler = config.to_builder()?.build(fetcher)?;

    let handle = crawler.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.shutdown();
        }
    });

    let started_at = Utc::now();
    let mut results = Vec::new();

    match crawler.run(&cli.start_url).await? {
        CrawlOutput::Batch(batch) => {
            for result in &batch {
                print_result(result, cli.json)?;
            }
            results = batch;
        }
        CrawlOutput::Stream(mut stream) => {
            while let Some(result) = stream.next().await {
                print_result(&result, cli.json)?;
                results.push(result);
            }
        }
    }

    let finished_at = Utc::now();
    let stats = CrawlStatistics::from_results(&results);

    if !cli.quiet {
        eprintln!();
        print_statistics(&stats);
    }

    if let Some(path) = &cli.summary {
        let info = RunInfo {
            start_url: cli.start_url.clone(),
            strategy: crawler.strategy(),
            started_at,
            finished_at,
            config_hash: Some(config_hash),
            interrupted: crawler.shutdown_handle().is_shutdown(),
            filter_stats: crawler.filter_stats(),
        };
        generate_markdown_summary(&info, &stats, path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        tracing::info!("Summary written to {}", path.display());
    }

    Ok(())
}

fn print_result(result: &CrawlResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }

    let status = result
        .status_code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "---".to_string());

    match &result.error {
        Some(error) => println!(
            "{} {} [depth {}] error: {}",
            status, result.url, result.metadata.depth, error
        ),
        None => println!(
            "{} {} [depth {}, score {:.3}]",
            status, result.url, result.metadata.depth, result.metadata.score
        ),
    }

    Ok(())
}
