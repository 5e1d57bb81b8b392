//! Crawler module: everything between the directory and the sinks
//!
//! This module contains the pull pipeline, including:
//! - HTTP page fetching with retry and a shared in-flight limit
//! - Listing markup parsing
//! - Last-page discovery for unbounded page specs
//! - Per-term ranking collection
//! - Pull orchestration across terms

mod collector;
mod coordinator;
mod fetcher;
mod parser;
mod scanner;

pub use collector::RankCollector;
pub use coordinator::{
    PullContext, PullOrchestrator, PullReport, TermFailure, TermOutcome, TermStatus,
};
pub use fetcher::{build_http_client, HttpPageFetcher, PageFetcher, ThrottledFetcher};
pub use parser::extract_names;
pub use scanner::{PageRangeScanner, INITIAL_PROBE_PAGE, MAX_PROBE_PAGE};

use crate::config::Config;
use crate::output::open_sink;

/// Runs a complete pull as configured
///
/// This is the main entry point for a pull. It will:
/// 1. Open the configured sink
/// 2. Build the HTTP fetcher
/// 3. Collect every term and commit the pull
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file, recorded with the pull
///
/// # Returns
///
/// * `Ok(PullReport)` - Every term was attempted
/// * `Err(RippleError)` - The pull could not start or could not be committed
pub async fn run_pull(config: &Config, config_hash: &str) -> crate::Result<PullReport> {
    let context = PullContext::from_config(config)?;
    let sink = open_sink(config, config_hash)?;
    let fetcher = HttpPageFetcher::new(&config.directory, &config.user_agent)?;
    let collector = RankCollector::new(fetcher, config.pull.max_concurrent_fetches as usize);

    PullOrchestrator::new(collector, sink).run(&context).await
}
