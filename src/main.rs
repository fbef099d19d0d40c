//! Review-Harvester main entry point
//!
//! This is the command-line interface for the Review-Harvester crawler.

use anyhow::Context;
use clap::Parser;
use review_harvester::config::{load_config_with_hash, Config};
use review_harvester::crawler::Harvester;
use review_harvester::output::{
    export_summary, format_markdown_report, joined_to_json, load_statistics, print_statistics,
};
use review_harvester::storage::{open_storage, SnapshotStore};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Review-Harvester: a product listing and review crawler
///
/// Review-Harvester searches a product-listing site, follows its pagination,
/// collects every product's reviews and stores the result as a single
/// snapshot that replaces the previous one.
#[derive(Parser, Debug)]
#[command(name = "review-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A product listing and review crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Search query to harvest
    #[arg(short = 'Q', long, required_unless_present_any = ["show", "stats", "export_summary"])]
    query: Option<String>,

    /// Number of listing pages to traverse (overrides max-pages)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pages: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Render the stored snapshot and exit
    #[arg(long, conflicts_with_all = ["stats", "export_summary", "query"])]
    show: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["show", "export_summary", "query"])]
    stats: bool,

    /// Generate markdown report from the stored snapshot and exit
    #[arg(long, conflicts_with_all = ["show", "stats", "query"])]
    export_summary: bool,

    /// Render the joined view as JSON instead of markdown
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.show {
        handle_show(&config, cli.json)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else if let Some(query) = cli.query.as_deref() {
        let pages = cli.pages.unwrap_or(config.harvester.max_pages);
        handle_harvest(&config, query, pages, cli.json).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("review_harvester=info,warn"),
            1 => EnvFilter::new("review_harvester=debug,info"),
            2 => EnvFilter::new("review_harvester=trace,debug"),
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

/// Prints the joined view as markdown or JSON
fn render_joined(storage: &dyn SnapshotStore, json: bool) -> anyhow::Result<()> {
    let items = storage.read_joined()?;

    if json {
        println!("{}", joined_to_json(&items)?);
    } else {
        let snapshot = storage.snapshot_info()?;
        print!("{}", format_markdown_report(&items, snapshot.as_ref()));
    }

    Ok(())
}

/// Handles the --show mode: renders the stored snapshot
fn handle_show(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    render_joined(&storage, json)
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: writes the markdown report
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    println!("=== Exporting Harvest Report ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = open_storage(Path::new(&config.output.database_path))?;

    tracing::info!("Loading snapshot from database...");
    let items = export_summary(&storage, Path::new(&config.output.summary_path))?;

    println!(
        "✓ Report with {} items exported to: {}",
        items, config.output.summary_path
    );

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config, query: &str, pages: u32, json: bool) -> anyhow::Result<()> {
    let harvester = Harvester::new(config)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current page");
            on_signal.cancel();
        }
    });

    tracing::info!(
        "Harvesting '{}' over up to {} pages ({} concurrent detail fetches)",
        query,
        pages,
        harvester.max_concurrency()
    );

    let result = harvester
        .harvest_with_cancellation(query, pages, cancel)
        .await;

    if result.is_empty() {
        println!("No data found... try again!");
        return Ok(());
    }

    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    if let Err(e) = storage.replace_and_store(&result) {
        tracing::error!("Storing the harvest failed: {}", e);
        return Err(e).context("snapshot was not replaced");
    }

    render_joined(&storage, json)
}
