//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror website mirroring engine.

use anyhow::Context;
use clap::Parser;
use site_mirror::config::{read_config_with_hash, validate, Config};
use site_mirror::crawler::run_mirror;
use site_mirror::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Mirror: mirror a website to local storage
///
/// Site-Mirror discovers every page reachable from the root URL, then
/// downloads each page with its same-origin images, stylesheets and scripts,
/// reproducing the site's path hierarchy under the output directory.
/// Files that already exist are skipped, so an interrupted run can simply be
/// started again.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version)]
#[command(about = "Mirror a website to local storage", long_about = None)]
struct Cli {
    /// Root URL to mirror (overrides the config file)
    #[arg(value_name = "ROOT_URL")]
    root_url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Workers per phase
    #[arg(long, value_name = "N")]
    parallel: Option<usize>,

    /// Simultaneous in-flight requests across both phases
    #[arg(long, value_name = "N")]
    max_requests: Option<usize>,

    /// Attempts per request (only timeouts are retried)
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, value_name = "N")]
    timeout_ms: Option<u64>,

    /// Rewrite internal links so the mirror browses offline
    #[arg(long)]
    rewrite_links: bool,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be mirrored without fetching anything
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply(&self, config: &mut Config) {
        if let Some(root_url) = &self.root_url {
            config.mirror.root_url = root_url.clone();
        }
        if let Some(output) = &self.output {
            config.mirror.output_directory = output.clone();
        }
        if let Some(parallel) = self.parallel {
            config.limits.max_parallel_activities = parallel;
        }
        if let Some(max_requests) = self.max_requests {
            config.limits.max_concurrent_requests = max_requests;
        }
        if let Some(retries) = self.retries {
            config.limits.max_retries = retries;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.limits.per_request_timeout = timeout_ms;
        }
        if self.rewrite_links {
            config.mirror.rewrite_links = true;
        }
        if self.no_progress || self.quiet {
            config.progress.enabled = false;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let summary = run_mirror(config).await.context("mirror failed")?;
    if !cli.quiet {
        print_summary(&summary);
    }
    if !summary.is_complete() {
        tracing::warn!("Mirror is partial: {} failures", summary.failures);
    }

    Ok(())
}

/// Reads the config file if given, merges the CLI overrides and validates once
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    cli.apply(&mut config);
    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mirror=info,warn"),
            1 => EnvFilter::new("site_mirror=debug,info"),
            2 => EnvFilter::new("site_mirror=trace,debug"),
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

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Site-Mirror Dry Run ===\n");

    println!("Mirror:");
    println!("  Root URL: {}", config.mirror.root_url);
    println!("  Output directory: {}", config.mirror.output_directory.display());
    println!("  Rewrite links: {}", config.mirror.rewrite_links);

    println!("\nLimits:");
    println!(
        "  Max parallel activities: {}",
        config.limits.max_parallel_activities
    );
    println!(
        "  Max concurrent requests: {}",
        config.limits.max_concurrent_requests
    );
    println!("  Max retries: {}", config.limits.max_retries);
    println!("  Per-request timeout: {}ms", config.limits.per_request_timeout);
    println!("  Retry delay: {}ms", config.limits.retry_delay);

    println!("\nProgress:");
    println!("  Enabled: {}", config.progress.enabled);
    println!("  Interval: {}ms", config.progress.interval);
    println!("  Quiescence samples: {}", config.progress.quiescence_samples);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}
