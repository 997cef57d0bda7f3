//! Jobtrawl main entry point
//!
//! This is the command-line interface for the Jobtrawl listing scraper.

use clap::Parser;
use jobtrawl::config::{load_config_with_hash, Config};
use jobtrawl::crawler::{Coordinator, Phase, PhaseReport, ProxyClient};
use jobtrawl::storage::{open_storage, SqliteStorage, Storage};
use jobtrawl::TrawlError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Jobtrawl: a phased job-listing scraper
///
/// Jobtrawl discovers how many result pages each search query has, scrapes
/// the listings on every page, and then enriches each listing from its
/// detail page. All requests go through a rendering proxy.
#[derive(Parser, Debug)]
#[command(name = "jobtrawl")]
#[command(version)]
#[command(about = "A phased job-listing scraper", long_about = None)]
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

    /// Create search queries from a titles file (one per line) before running
    #[arg(long, value_name = "FILE")]
    ingest: Option<PathBuf>,

    /// Run a single phase instead of all three (discover, listings, details)
    #[arg(long, value_name = "PHASE")]
    phase: Option<Phase>,

    /// Skip the startup proxy health check
    #[arg(long)]
    skip_health_check: bool,

    /// Validate config and show what would run without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "export_csv", "ingest"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_csv"])]
    stats: bool,

    /// Export search queries and listings as CSV and exit
    #[arg(long, value_name = "DIR", num_args = 0..=1, conflicts_with_all = ["dry_run", "stats"])]
    export_csv: Option<Option<PathBuf>>,

    /// Leave queries with no results out of the CSV export
    #[arg(long, requires = "export_csv")]
    skip_empty: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        return handle_dry_run(&config, cli.phase);
    }

    let storage = Arc::new(open_storage(Path::new(&config.output.database_path))?);

    if cli.stats {
        return handle_stats(&config, &*storage);
    }

    if let Some(dir) = cli.export_csv {
        let dir = dir.unwrap_or_else(|| PathBuf::from(&config.output.csv_dir));
        return handle_export_csv(&*storage, &dir, cli.skip_empty);
    }

    if let Some(path) = &cli.ingest {
        let titles = jobtrawl::ingest::read_titles(path)?;
        jobtrawl::ingest::ingest_titles(&*storage, &config.site, &titles)?;
    }

    handle_pipeline(config, storage, cli.phase, cli.skip_health_check).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jobtrawl=info,warn"),
            1 => EnvFilter::new("jobtrawl=debug,info"),
            2 => EnvFilter::new("jobtrawl=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config, phase: Option<Phase>) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Jobtrawl Dry Run ===\n");

    println!("Pipeline Configuration:");
    println!("  Pool size: {}", config.pipeline.pool_size);
    println!("  Retry limit: {}", config.pipeline.retry_limit);
    println!("  Fetch timeout: {}s", config.pipeline.fetch_timeout_secs);
    println!("  Backoff unit: {}ms", config.pipeline.backoff_unit_ms);
    match config.pipeline.max_backoff_secs {
        Some(cap) => println!("  Max backoff: {}s", cap),
        None => println!("  Max backoff: uncapped"),
    }
    println!("  Re-scrape existing: {}", config.pipeline.rescrape_existing);

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Location: {}", config.site.location);

    println!("\nProxy:");
    println!("  Endpoint: {}", config.proxy.endpoint);
    println!(
        "  Country code: {}",
        config.proxy.country_code.as_deref().unwrap_or("none")
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Spillover: {}", config.output.spillover_path);
    println!("  CSV directory: {}", config.output.csv_dir);

    let phases: Vec<String> = match phase {
        Some(phase) => vec![phase.to_string()],
        None => Phase::ALL.iter().map(Phase::to_string).collect(),
    };

    println!("\n✓ Configuration is valid");
    println!("✓ Would run: {}", phases.join(", "));

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config, storage: &dyn Storage) -> Result<(), Box<dyn std::error::Error>> {
    use jobtrawl::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    let stats = load_statistics(storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-csv mode: writes CSV snapshots of both tables
fn handle_export_csv(
    storage: &dyn Storage,
    dir: &Path,
    skip_empty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use jobtrawl::output::export_csv;

    println!("=== Exporting CSV ===\n");

    let export = export_csv(storage, dir, skip_empty)?;

    println!(
        "✓ {} search queries written to: {}",
        export.search_queries,
        export.search_queries_path.display()
    );
    println!(
        "✓ {} listings written to: {}",
        export.listings,
        export.listings_path.display()
    );

    Ok(())
}

/// Handles the main pipeline run
async fn handle_pipeline(
    config: Config,
    storage: Arc<SqliteStorage>,
    phase: Option<Phase>,
    skip_health_check: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let timeout = Duration::from_secs(config.pipeline.fetch_timeout_secs);
    let client = ProxyClient::new(&config.proxy, timeout)?;

    if skip_health_check {
        tracing::warn!("Skipping proxy health check");
    } else {
        tracing::info!("Checking proxy health");
        if let Err(e) = client.health_check(&config.site.base_url).await {
            tracing::error!("Proxy health check failed: {}", e);
            return Err(TrawlError::HealthCheck(e.to_string()).into());
        }
    }

    tracing::info!(
        "Pool size: {}, retry limit: {}, fetch timeout: {:?}",
        config.pipeline.pool_size,
        config.pipeline.retry_limit,
        timeout
    );

    let coordinator = Coordinator::new(config, storage, client)?;

    let reports = match phase {
        Some(phase) => vec![coordinator.run_phase(phase).await?],
        None => coordinator.run().await?,
    };

    log_reports(&reports);

    Ok(())
}

fn log_reports(reports: &[PhaseReport]) {
    for report in reports {
        tracing::info!(
            "{}: {}/{} tasks succeeded in {:?}",
            report.phase,
            report.succeeded,
            report.total(),
            report.elapsed
        );
    }
}
