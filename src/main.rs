//! Kagami main entry point
//!
//! Command-line interface for the kagami website mirroring tool.

use anyhow::{bail, Context};
use clap::Parser;
use kagami::config::{load_config_with_hash, CrawlConfig, SummarizerSection};
use kagami::output::print_summary;
use kagami::MirrorSession;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Kagami: mirror a website to local storage
///
/// Starting from a seed URL, kagami fetches pages, downloads their embedded
/// resources, and follows same-site links breadth-first up to a configured
/// depth, producing an offline replica.
#[derive(Parser, Debug)]
#[command(name = "kagami")]
#[command(version = "0.1.0")]
#[command(about = "A single-site offline mirroring tool", long_about = None)]
struct Cli {
    /// Seed URL to mirror (required unless given in the config file)
    #[arg(value_name = "URL")]
    seed: Option<String>,

    /// Path to a TOML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mirror root directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum traversal depth (1 = seed page only)
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Route page fetches through the dynamic-rendering proxy
    #[arg(long)]
    dynamic: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Extra host allowed beyond the seed's (repeatable)
    #[arg(long = "allow-host", value_name = "HOST")]
    allow_hosts: Vec<String>,

    /// Compress the finished mirror into mirror.zip
    #[arg(long)]
    zip: bool,

    /// Summarize the seed page with the configured AI endpoint
    #[arg(long)]
    summarize: bool,

    /// Validate configuration and show what would be mirrored without fetching
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let result = MirrorSession::new(config)
        .run()
        .await
        .context("mirror session failed")?;

    print_summary(&result);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kagami=info,warn"),
            1 => EnvFilter::new("kagami=debug,info"),
            2 => EnvFilter::new("kagami=trace,debug"),
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

/// Assembles the session configuration from file and flags
///
/// A config file provides the base; every CLI flag overrides its counterpart.
/// Without a file, the seed URL is required and the output root defaults to
/// `./mirror`.
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!(
                "Loaded configuration from {} (hash: {})",
                path.display(),
                &hash[..16]
            );
            config
        }
        None => {
            let Some(seed) = &cli.seed else {
                bail!("a seed URL is required (positional argument or config file)");
            };
            let output = cli.output.clone().unwrap_or_else(|| PathBuf::from("./mirror"));
            CrawlConfig::new(seed.clone(), output)
        }
    };

    if let Some(seed) = &cli.seed {
        config.crawl.seed_url = seed.clone();
    }
    if let Some(output) = &cli.output {
        config.output.root = output.clone();
    }
    if let Some(depth) = cli.max_depth {
        config.crawl.max_depth = depth;
    }
    if cli.dynamic {
        config.crawl.dynamic_rendering = true;
    }
    if let Some(timeout) = cli.timeout_secs {
        config.crawl.request_timeout_secs = timeout;
    }
    config
        .crawl
        .allowed_hosts
        .extend(cli.allow_hosts.iter().cloned());
    if cli.zip {
        config.output.archive = true;
    }
    if cli.summarize && config.summarizer.is_none() {
        config.summarizer = Some(SummarizerSection::default());
    }

    Ok(config)
}

/// Handles --dry-run: shows the effective configuration without fetching
fn handle_dry_run(config: &CrawlConfig) {
    println!("=== Kagami Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", config.crawl.seed_url);
    println!("  Max depth: {}", config.crawl.max_depth);
    println!("  Dynamic rendering: {}", config.crawl.dynamic_rendering);
    println!("  Request timeout: {}s", config.crawl.request_timeout_secs);
    if config.crawl.allowed_hosts.is_empty() {
        println!("  Allowed hosts: seed host only");
    } else {
        println!(
            "  Allowed hosts: seed host + {}",
            config.crawl.allowed_hosts.join(", ")
        );
    }

    println!("\nFetch:");
    println!("  Concurrent pages: {}", config.fetch.max_concurrent_pages);
    println!(
        "  Concurrent resource fetches: {}",
        config.fetch.max_concurrent_fetches
    );
    println!("  Render service: {}", config.fetch.render_service_url);

    println!("\nOutput:");
    println!("  Root: {}", config.output.root.display());
    println!("  Archive: {}", config.output.archive);
    println!("  Report: {}", config.output.report);

    match &config.summarizer {
        Some(summarizer) => println!("\nSummarizer: {} (key from ${})", summarizer.endpoint, summarizer.api_key_env),
        None => println!("\nSummarizer: disabled"),
    }

    match kagami::config::validate(config) {
        Ok(()) => println!("\n✓ Configuration is valid"),
        Err(e) => println!("\n✗ Configuration is invalid: {}", e),
    }
}
