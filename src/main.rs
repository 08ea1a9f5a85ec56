//! Book-Harvester main entry point
//!
//! This is the command-line interface for the Book-Harvester catalog crawler
//! and record server.

use anyhow::{bail, Context};
use book_harvester::config::{load_config_with_hash, Config, StorageBackend};
use book_harvester::crawler::{run_crawl, Coordinator, Stage, StageOutcome};
use book_harvester::storage::{open_book_store, BookStore, SqliteBookStore};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Book-Harvester: a catalog crawler and record server
///
/// Book-Harvester crawls a book catalog in three stages (categories,
/// listings, detail pages), stores normalized records in a JSON file or a
/// SQLite table, and serves them over HTTP.
#[derive(Parser, Debug)]
#[command(name = "book-harvester")]
#[command(version = "0.1.0")]
#[command(about = "A catalog crawler and record server", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the category navigation into the categories file
    Categories,

    /// Scrape every category's listing pages into the listings file
    Listings,

    /// Scrape every listed detail page into the configured store
    Details,

    /// Run the categories, listings and details stages in order
    Crawl,

    /// Serve stored books and categories over HTTP
    Serve,

    /// Empty the table backend and restart its id sequence
    ResetDb,

    /// Show aggregate statistics from the configured store
    Stats,

    /// Validate the configuration and print it without crawling
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Categories => handle_stage(config, Stage::Categories).await,
        Command::Listings => handle_stage(config, Stage::Listings).await,
        Command::Details => handle_stage(config, Stage::Details).await,
        Command::Crawl => handle_crawl(config).await,
        Command::Serve => handle_serve(config).await,
        Command::ResetDb => handle_reset_db(&config),
        Command::Stats => handle_stats(&config),
        Command::Check => handle_check(&config, &config_hash),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("book_harvester=info,warn"),
            1 => EnvFilter::new("book_harvester=debug,info"),
            2 => EnvFilter::new("book_harvester=trace,debug"),
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

/// Runs a single crawl stage
async fn handle_stage(config: Config, stage: Stage) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config)?;

    let outcome = match stage {
        Stage::Categories => coordinator.run_categories().await?,
        Stage::Listings => coordinator.run_listings().await?,
        Stage::Details => {
            let mut store =
                open_book_store(coordinator.config()).context("Failed to open book store")?;
            coordinator.run_details(store.as_mut()).await?
        }
    };

    report_outcome(stage, &outcome);
    Ok(())
}

/// Handles the crawl command: all three stages in order
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl from {} ({} concurrent requests, {:?} backend)",
        config.crawler.start_url,
        config.crawler.max_concurrent_requests,
        config.storage.backend
    );

    match run_crawl(config).await {
        Ok(outcomes) => {
            for (stage, outcome) in &outcomes {
                report_outcome(*stage, outcome);
            }
            if outcomes.iter().all(|(_, outcome)| outcome.is_completed()) {
                tracing::info!("Crawl completed successfully");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

fn report_outcome(stage: Stage, outcome: &StageOutcome) {
    match outcome {
        StageOutcome::Completed(counters) => {
            println!(
                "✓ {}: {} pages, {} records, {} inserted, {} updated, {} failed",
                stage,
                counters.pages_fetched,
                counters.records_emitted,
                counters.inserted,
                counters.updated,
                counters.failed
            );
            for anomaly in &counters.anomalies {
                println!("  ! {}", anomaly);
            }
        }
        StageOutcome::MissingInput { path, run_first } => {
            println!(
                "✗ {}: {} not found, run `{}` first",
                stage,
                path.display(),
                run_first
            );
        }
    }
}

/// Handles the serve command
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    book_harvester::api::serve(&config)
        .await
        .context("API server failed")
}

/// Handles the reset-db command: truncates the table backend
fn handle_reset_db(config: &Config) -> anyhow::Result<()> {
    if config.storage.backend != StorageBackend::Table {
        bail!("reset-db requires `[storage] backend = \"table\"`");
    }

    let path = Path::new(&config.storage.database_path);
    let mut store = SqliteBookStore::new(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    let before = store.count()?;
    let removed = store.reset()?;
    let after = store.count()?;
    tracing::info!(
        "Reset {}: {} rows before, {} removed, {} after",
        path.display(),
        before,
        removed,
        after
    );

    println!("✓ Database {} reset ({} rows removed)", path.display(), removed);
    Ok(())
}

/// Handles the stats command: prints aggregate views
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use book_harvester::output::{load_statistics, print_statistics};

    match config.storage.backend {
        StorageBackend::File => println!("Store: {}\n", config.output.details_path),
        StorageBackend::Table => println!("Database: {}\n", config.storage.database_path),
    }

    let store = open_book_store(config).context("Failed to open book store")?;
    let stats = load_statistics(store.as_ref())?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the check command: validates config and shows what would run
fn handle_check(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    println!("=== Book-Harvester Configuration ===\n");

    println!("Crawler:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Request interval: {}ms", config.crawler.request_interval_ms);
    println!(
        "  Max pages per category: {}",
        config.crawler.max_pages_per_category
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nStage Files:");
    println!("  Categories: {}", config.output.categories_path);
    println!("  Listings: {}", config.output.listings_path);
    println!("  Details: {}", config.output.details_path);

    println!("\nStorage:");
    match config.storage.backend {
        StorageBackend::File => println!("  Backend: file ({})", config.output.details_path),
        StorageBackend::Table => println!("  Backend: table ({})", config.storage.database_path),
    }

    println!("\nServer:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);

    println!("\n✓ Configuration is valid (hash: {})", config_hash);

    Ok(())
}
