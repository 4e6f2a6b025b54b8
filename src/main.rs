//! Sitemap-Crawler main entry point
//!
//! This is the command-line interface for the sitemap crawler.

use anyhow::Context;
use clap::Parser;
use sitemap_crawler::config::{load_config_or_default, Config, DEFAULT_CONFIG_PATH};
use sitemap_crawler::output::{output_dir_for, print_statistics, write_sitemaps};
use sitemap_crawler::{crawl, validate_seed_url};
use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "sitemap_generator.log";

/// Sitemap-Crawler: a polite single-site sitemap generator
///
/// Crawls one website breadth-first while respecting robots.txt, a global
/// request rate and a concurrency cap, then writes sitemap.xml (split and
/// indexed when large), gzip copies, and an HTML listing.
#[derive(Parser, Debug)]
#[command(name = "sitemap-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite single-site sitemap generator", long_about = None)]
struct Cli {
    /// Website to crawl (prompted for when omitted)
    #[arg(value_name = "URL")]
    seed: Option<String>,

    /// Path to TOML configuration file (defaults apply when it does not exist)
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Output directory (defaults to the seed's host)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    if cli.dry_run {
        handle_dry_run(&config, &cli.config, config_hash.as_deref());
        return Ok(());
    }

    let raw_seed = match cli.seed {
        Some(seed) => seed,
        None => prompt_for_seed()?,
    };
    let seed = validate_seed_url(&raw_seed).context("Invalid URL")?;

    let output_dir = cli.output_dir.unwrap_or_else(|| output_dir_for(&seed));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    setup_logging(cli.verbose, cli.quiet, &output_dir)?;

    match &config_hash {
        Some(hash) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            cli.config.display(),
            hash
        ),
        None => tracing::info!(
            "No configuration file at {}, using defaults",
            cli.config.display()
        ),
    }
    tracing::info!("Starting sitemap generation for {}", seed);

    let report = crawl(&seed, &config).await.map_err(|e| {
        tracing::error!("Crawl failed: {}", e);
        e
    })?;

    let written = write_sitemaps(&report, &output_dir).map_err(|e| {
        tracing::error!("Failed to write sitemaps: {}", e);
        e
    })?;

    if !cli.quiet {
        println!();
        print_statistics(&report.stats);
        println!();
        println!("Files written to {}:", output_dir.display());
        for path in &written {
            println!("  {}", path.display());
        }
        println!(
            "Check '{}' for detailed logs",
            output_dir.join(LOG_FILE_NAME).display()
        );
    }

    tracing::info!(
        "Done: {} URLs in {} file(s), {} paths written",
        report.entries.len(),
        report.files.len(),
        written.len()
    );

    Ok(())
}

/// Asks for the website URL on stdin
fn prompt_for_seed() -> anyhow::Result<String> {
    print!("Enter the website URL (e.g., https://example.com): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Sets up logging to stdout and to the log file in the output directory
fn setup_logging(verbose: u8, quiet: bool, output_dir: &Path) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_crawler=info,warn"),
            1 => EnvFilter::new("sitemap_crawler=debug,info"),
            2 => EnvFilter::new("sitemap_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let log_path = output_dir.join(LOG_FILE_NAME);
    let log_file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();

    Ok(())
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, path: &Path, hash: Option<&str>) {
    println!("=== Sitemap-Crawler Dry Run ===\n");

    match hash {
        Some(hash) => println!("Config file: {} (hash: {})", path.display(), hash),
        None => println!("Config file: {} (not found, using defaults)", path.display()),
    }

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.max_depth);
    println!("  Max concurrent requests: {}", config.max_concurrent_requests);
    println!("  Requests per second: {}", config.requests_per_second);
    println!("  Host scope: {:?}", config.host_scope);
    println!("  User agent: {}", config.user_agent);
    println!("  Request timeout: {}s", config.request_timeout_secs);
    println!("  Robots.txt timeout: {}s", config.robots_timeout_secs);
    println!(
        "  Retries: {} (backoff {}ms)",
        config.max_retries, config.retry_backoff_ms
    );

    println!("\nOutput:");
    println!("  Max URLs per sitemap: {}", config.max_urls_per_sitemap);

    println!("\nExclude Patterns ({}):", config.exclude_patterns.len());
    for pattern in &config.exclude_patterns {
        println!("  - {}", pattern);
    }

    println!("\nValid Extensions ({}):", config.valid_extensions.len());
    for ext in &config.valid_extensions {
        if ext.is_empty() {
            println!("  - (no extension)");
        } else {
            println!("  - {}", ext);
        }
    }

    println!("\n✓ Configuration is valid");
}
