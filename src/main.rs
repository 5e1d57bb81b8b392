//! Rank-Ripple main entry point
//!
//! This is the command-line interface for the Rank-Ripple listing puller.

use clap::Parser;
use rank_ripple::config::{load_config_with_hash, validate, Config};
use rank_ripple::crawler::{run_pull, PullContext, PullReport, TermStatus};
use rank_ripple::output::{load_latest_pull, print_pull_summary, SinkKind};
use rank_ripple::ranking::{display_term, LastPage};
use rank_ripple::storage::SqliteStorage;
use rank_ripple::ExitStatus;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Rank-Ripple: A ranked-listing puller
///
/// Rank-Ripple pulls the ranked listing pages of a paginated web directory
/// for each configured search term and records every term under one
/// numbered, timestamped pull.
#[derive(Parser, Debug)]
#[command(name = "rank-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A ranked-listing puller", long_about = None)]
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

    /// Pull only this search term (repeatable); replaces search-terms
    #[arg(long = "term", value_name = "TERM")]
    terms: Vec<String>,

    /// Override max-pages: a positive integer or "all"
    #[arg(long, value_name = "N|all")]
    max_pages: Option<LastPage>,

    /// Override query-type: database, console or file
    #[arg(long, value_name = "KIND")]
    query_type: Option<SinkKind>,

    /// Validate config and show what would be pulled without fetching
    #[arg(long, conflicts_with = "show_latest")]
    dry_run: bool,

    /// Print the most recent pull recorded in the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    show_latest: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(status) => status.into(),
        Err(e) => {
            tracing::error!("{}", e);
            e.exit_status().into()
        }
    }
}

async fn run(cli: Cli) -> rank_ripple::Result<ExitStatus> {
    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if apply_overrides(&mut config, &cli) {
        validate(&config)?;
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
        Ok(ExitStatus::Success)
    } else if cli.show_latest {
        handle_show_latest(&config)?;
        Ok(ExitStatus::Success)
    } else {
        handle_pull(&config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so console rankings on stdout stay clean.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rank_ripple=info,warn"),
            1 => EnvFilter::new("rank_ripple=debug,info"),
            2 => EnvFilter::new("rank_ripple=trace,debug"),
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

/// Applies command-line overrides; returns whether anything changed
fn apply_overrides(config: &mut Config, cli: &Cli) -> bool {
    let mut changed = false;

    if !cli.terms.is_empty() {
        config.pull.search_terms = cli.terms.clone();
        changed = true;
    }
    if let Some(max_pages) = cli.max_pages {
        config.pull.max_pages = max_pages;
        changed = true;
    }
    if let Some(query_type) = cli.query_type {
        config.pull.query_type = query_type;
        changed = true;
    }

    changed
}

/// Handles the --dry-run mode: validates config and shows what would be pulled
fn handle_dry_run(config: &Config) -> rank_ripple::Result<()> {
    let context = PullContext::from_config(config)?;

    println!("=== Rank-Ripple Dry Run ===\n");

    println!("Directory:");
    println!("  Label: {}", config.directory.label);
    println!("  Base URL: {}", config.directory.base_url);
    println!("  Container selector: {}", config.directory.container_selector);
    println!("  Item selector: {}", config.directory.item_selector);
    println!(
        "  Timeout: {}s, retries: {}",
        config.directory.request_timeout_secs, config.directory.retries
    );

    println!("\nPull:");
    println!("  First page: {}", context.page_spec.first);
    println!("  Max pages: {}", context.page_spec.last);
    println!(
        "  Max concurrent fetches: {}",
        config.pull.max_concurrent_fetches
    );
    println!("  Sink: {}", config.pull.query_type);
    match config.pull.query_type {
        SinkKind::Database => println!("  Database: {}", config.output.database_path),
        SinkKind::File => println!("  Results directory: {}", config.output.results_dir),
        SinkKind::Console => {}
    }

    println!("\nSearch Terms ({}):", context.terms.len());
    for term in &context.terms {
        println!("  - {}", display_term(term));
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would pull {} search terms", context.terms.len());

    Ok(())
}

/// Handles the --show-latest mode: prints the most recent committed pull
fn handle_show_latest(config: &Config) -> rank_ripple::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    match load_latest_pull(&storage)? {
        Some(summary) => print_pull_summary(&config.directory.label, &summary),
        None => println!("No pulls recorded yet"),
    }

    Ok(())
}

/// Handles the main pull operation
async fn handle_pull(config: &Config, config_hash: &str) -> rank_ripple::Result<ExitStatus> {
    tracing::info!(
        "Pulling {} terms from {} into {} sink",
        config.pull.search_terms.len(),
        config.directory.label,
        config.pull.query_type
    );

    let report = run_pull(config, config_hash).await?;
    log_report(&report);

    Ok(report.exit_status())
}

fn log_report(report: &PullReport) {
    for outcome in report.failed() {
        if let TermStatus::Failed(failure) = &outcome.status {
            tracing::warn!("  {} - {}", display_term(&outcome.term), failure);
        }
    }

    let status = report.exit_status();
    match status {
        ExitStatus::Success => tracing::info!(
            "Pull {} succeeded ({} entries)",
            report.pull.id,
            report.total_entries()
        ),
        _ => tracing::error!(
            "Pull {} finished with {} of {} terms failed (exit {})",
            report.pull.id,
            report.failed_count(),
            report.outcomes.len(),
            status.code()
        ),
    }
}
