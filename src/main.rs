//! Driftnet main entry point
//!
//! This is the command-line interface for the Driftnet crawler.

use anyhow::{bail, Context};
use clap::Parser;
use driftnet::config::{load_config, load_seeds, validate, Config, ParserStrategy};
use driftnet::output::{LogSink, TsvLogSink};
use driftnet::Coordinator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Driftnet: a polite, bounded, breadth-first web crawler
///
/// Driftnet crawls outward from a list of seed URLs, honoring robots.txt,
/// preferring shallow pages and less-visited hosts, and writes one TSV line
/// per fetched page.
#[derive(Parser, Debug)]
#[command(name = "driftnet")]
#[command(version)]
#[command(about = "A polite, bounded, breadth-first web crawler", long_about = None)]
struct Cli {
    /// Seed list: one URL per line, `#` comments allowed
    #[arg(long, value_name = "FILE")]
    seeds: PathBuf,

    /// Optional TOML configuration file; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path of the TSV visit log
    #[arg(long, value_name = "FILE")]
    log: Option<String>,

    /// User-Agent sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Number of concurrent workers
    #[arg(long)]
    threads: Option<usize>,

    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<u64>,

    /// Do not follow links from pages at this depth or deeper
    #[arg(long)]
    max_depth: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Ignore robots.txt
    #[arg(long)]
    no_robots: bool,

    /// Novelty weight for the host
    #[arg(long)]
    novelty_domain: Option<f64>,

    /// Novelty weight for the superdomain
    #[arg(long)]
    novelty_super: Option<f64>,

    /// How strongly novelty shifts priority within a depth level
    #[arg(long)]
    novelty_scale: Option<f64>,

    /// Maximum HTML bytes read per page
    #[arg(long)]
    max_html_bytes: Option<usize>,

    /// Link extraction strategy
    #[arg(long, value_enum)]
    parser: Option<ParserStrategy>,

    /// Add timing and link-count columns to the log
    #[arg(long)]
    debug_metrics: bool,

    /// Validate configuration and seeds, print them, and exit
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(log) = &self.log {
            config.output.log_path = log.clone();
        }
        if let Some(user_agent) = &self.user_agent {
            config.crawler.user_agent = user_agent.clone();
        }
        if let Some(threads) = self.threads {
            config.crawler.threads = threads;
        }
        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = max_pages;
        }
        if let Some(max_depth) = self.max_depth {
            config.crawler.max_depth = max_depth;
        }
        if let Some(timeout) = self.timeout {
            config.crawler.timeout_secs = timeout;
        }
        if self.no_robots {
            config.crawler.respect_robots = false;
        }
        if let Some(weight) = self.novelty_domain {
            config.priority.novelty_weight_domain = weight;
        }
        if let Some(weight) = self.novelty_super {
            config.priority.novelty_weight_superdomain = weight;
        }
        if let Some(scale) = self.novelty_scale {
            config.priority.novelty_scale = scale;
        }
        if let Some(max_html_bytes) = self.max_html_bytes {
            config.content.max_html_bytes = max_html_bytes;
        }
        if let Some(parser) = self.parser {
            config.content.parser = parser;
        }
        if self.debug_metrics {
            config.output.debug_metrics = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    let seeds = load_seeds(&cli.seeds)
        .with_context(|| format!("Failed to read seeds from {}", cli.seeds.display()))?;
    if seeds.is_empty() {
        bail!("No seed URLs found in {}", cli.seeds.display());
    }

    if cli.dry_run {
        print_dry_run(&config, &seeds);
        return Ok(());
    }

    handle_crawl(config, seeds).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("driftnet=info,warn"),
            1 => EnvFilter::new("driftnet=debug,info"),
            2 => EnvFilter::new("driftnet=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration and seeds
fn print_dry_run(config: &Config, seeds: &[String]) {
    println!("=== Driftnet Dry Run ===\n");

    println!("Crawler:");
    println!("  User agent: {}", config.crawler.user_agent);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    println!("  Timeout: {}s", config.crawler.timeout_secs);
    println!("  Workers: {}", config.crawler.threads);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max depth: {}", config.crawler.max_depth);

    println!("\nContent:");
    println!("  HTML prefix: {}", config.content.html_mime_prefix);
    println!("  Max HTML bytes: {}", config.content.max_html_bytes);
    println!("  Parser: {:?}", config.content.parser);
    println!(
        "  Disallowed extensions: {}",
        config.content.disallowed_extensions.len()
    );

    println!("\nPriority:");
    println!("  Domain weight: {}", config.priority.novelty_weight_domain);
    println!(
        "  Superdomain weight: {}",
        config.priority.novelty_weight_superdomain
    );
    println!("  Scale: {}", config.priority.novelty_scale);

    println!("\nOutput:");
    println!("  Log: {}", config.output.log_path);
    println!("  Debug metrics: {}", config.output.debug_metrics);

    println!("\nSeeds ({}):", seeds.len());
    for seed in seeds {
        println!("  - {}", seed);
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, seeds: Vec<String>) -> anyhow::Result<()> {
    let log_path = Path::new(&config.output.log_path).to_path_buf();
    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let sink: Arc<dyn LogSink> = Arc::new(
        TsvLogSink::create(&log_path, config.output.debug_metrics)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?,
    );

    let coordinator = Coordinator::new(config, sink)?;
    let accepted = coordinator.seed(&seeds);
    tracing::info!("Seeded frontier with {} of {} URLs", accepted, seeds.len());

    let stop = coordinator.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing in-flight pages");
            stop.stop();
        }
    });

    let summary = coordinator.run().await.context("Crawl failed")?;
    tracing::info!(
        "Wrote {} records to {}",
        summary.pages_crawled,
        log_path.display()
    );

    Ok(())
}
