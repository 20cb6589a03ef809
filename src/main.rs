//! Vaga-Harvest main entry point
//!
//! This is the command-line interface for the multi-site job harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vaga_harvest::config::Config;
use vaga_harvest::{Harvester, RecencyFilter, SearchRequest, Site};

/// Vaga-Harvest: a multi-site job posting harvester
///
/// Searches several job boards at once, scores every posting description
/// against the given keywords and prints the merged result as JSON.
#[derive(Parser, Debug)]
#[command(name = "vaga-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A multi-site job posting harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Job title to search for (repeatable)
    #[arg(long = "title", value_name = "TITLE", required_unless_present = "url")]
    titles: Vec<String>,

    /// Keyword phrase used for relevance scoring (repeatable)
    #[arg(long = "keyword", value_name = "PHRASE")]
    keywords: Vec<String>,

    /// Only keep postings published within this window
    #[arg(long, value_name = "24h|7d|30d|any", default_value = "any")]
    recency: RecencyFilter,

    /// Location as "city, state, country"
    #[arg(long, default_value = "Brazil")]
    location: String,

    /// Restrict the search to these sites (repeatable)
    #[arg(long = "site", value_name = "SITE")]
    sites: Vec<Site>,

    /// Harvest these search URLs directly instead of planning them (repeatable)
    #[arg(long = "url", value_name = "URL", conflicts_with = "titles")]
    url: Vec<String>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// Print the planned search URLs and exit without harvesting
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

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let harvester = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            Harvester::from_config_file(path)
                .with_context(|| format!("failed to start from {}", path.display()))?
        }
        None => Harvester::with_http(Config::default()).context("failed to build HTTP client")?,
    };

    let request = SearchRequest {
        titles: cli.titles,
        keywords: cli.keywords,
        recency: cli.recency,
        location: cli.location,
    };
    let sites = (!cli.sites.is_empty()).then_some(cli.sites.as_slice());

    if cli.dry_run {
        let urls = if cli.url.is_empty() {
            harvester.plan(&request, sites).await
        } else {
            cli.url
        };
        for (site, batch) in harvester.partition_urls(&urls) {
            println!("{} ({}):", site, batch.len());
            for url in batch {
                println!("  {}", url);
            }
        }
        return Ok(());
    }

    let outcome = if cli.url.is_empty() {
        harvester.search(&request, sites).await
    } else {
        harvester
            .harvest(&cli.url, &request.keywords, request.recency)
            .await
    };

    let json = if cli.pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{}", json);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the JSON result.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vaga_harvest=info,warn"),
            1 => EnvFilter::new("vaga_harvest=debug,info"),
            2 => EnvFilter::new("vaga_harvest=trace,debug"),
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
