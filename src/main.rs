//! Siteglean main entry point
//!
//! This is the command-line interface for the Siteglean crawler. The JSON
//! response is written to stdout and logs go to stderr.

use anyhow::Context;
use clap::Parser;
use siteglean::config::{load_config_with_hash, Config};
use siteglean::{ApiRequest, ApiResponse, ConfigResult, Harvester};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Siteglean: a bounded single-site crawler
///
/// Crawls a website breadth-first from a seed URL, staying on the seed's
/// host, and prints the readable text and metadata of every page as JSON.
#[derive(Parser, Debug)]
#[command(name = "siteglean")]
#[command(version)]
#[command(about = "A bounded single-site crawler", long_about = None)]
struct Cli {
    /// Seed URL to crawl
    #[arg(value_name = "URL", required_unless_present = "request")]
    url: Option<String>,

    /// Read the request from a JSON file instead
    #[arg(long, value_name = "FILE", conflicts_with = "url")]
    request: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages to visit
    #[arg(long)]
    max_pages: Option<usize>,

    /// Maximum link depth from the seed
    #[arg(long)]
    depth: Option<usize>,

    /// Crawl timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Fetch with plain HTTP only, skipping the headless browser
    #[arg(long)]
    no_js: bool,

    /// Settle delay for rendered pages in milliseconds
    #[arg(long, value_name = "MS")]
    wait_time: Option<u64>,

    /// Only check that the URL answers a HEAD request
    #[arg(long)]
    test_only: bool,

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

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let harvester = Harvester::from_config(&config).context("Failed to set up crawler")?;

    let response = match build_request(&cli) {
        Ok(request) => harvester.handle(request).await,
        Err(e) => {
            tracing::error!("Failed to build request: {}", e);
            ApiResponse::from(e)
        }
    };
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.is_error() {
        tracing::error!("Request failed with status {}", response.status_code());
        std::process::exit(1);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("siteglean=info,warn"),
            1 => EnvFilter::new("siteglean=debug,info"),
            2 => EnvFilter::new("siteglean=trace,debug"),
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

/// Builds the request from a JSON file or from flags
///
/// Flags given alongside `--request` override the file's fields.
fn build_request(cli: &Cli) -> ConfigResult<ApiRequest> {
    let mut request = match &cli.request {
        Some(path) => ApiRequest::from_file(path)?,
        None => ApiRequest {
            url: cli.url.clone(),
            ..ApiRequest::default()
        },
    };

    if cli.max_pages.is_some() {
        request.max_pages = cli.max_pages;
    }
    if cli.depth.is_some() {
        request.depth = cli.depth;
    }
    if cli.timeout.is_some() {
        request.timeout = cli.timeout;
    }
    if cli.no_js {
        request.js_render = Some(false);
    }
    if cli.wait_time.is_some() {
        request.wait_time = cli.wait_time;
    }
    if cli.test_only {
        request.test_only = true;
    }

    Ok(request)
}
