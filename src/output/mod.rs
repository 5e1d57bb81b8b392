//! Output module: the sinks rankings are routed to
//!
//! This module handles:
//! - The `Sink` trait and its database, console and file implementations
//! - The plain-text ranking format shared by console and file output
//! - Reports on pulls already committed to the database

mod console;
mod file;
mod sqlite_output;
pub mod stats;
mod traits;

pub use console::{format_ranking, ConsoleSink};
pub use file::FileSink;
pub use sqlite_output::DatabaseSink;
pub use stats::{format_pull_summary, load_latest_pull, print_pull_summary, PullSummary};
pub use traits::{Sink, SinkError, SinkKind, SinkResult};

use crate::config::Config;
use crate::storage::SqliteStorage;
use std::path::Path;

/// Opens the sink selected by `query-type`
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `config_hash` - Hash recorded with database pulls
///
/// # Returns
///
/// * `Ok(Box<dyn Sink>)` - A sink ready to receive rankings
/// * `Err(SinkError)` - The database or results directory could not be opened
pub fn open_sink(config: &Config, config_hash: &str) -> SinkResult<Box<dyn Sink>> {
    let label = &config.directory.label;

    let sink: Box<dyn Sink> = match config.pull.query_type {
        SinkKind::Database => {
            let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
            tracing::info!("Recording pulls in {}", config.output.database_path);
            Box::new(DatabaseSink::new(storage, config_hash))
        }
        SinkKind::Console => Box::new(ConsoleSink::stdout(label)),
        SinkKind::File => {
            let sink = FileSink::open(label, Path::new(&config.output.results_dir))?;
            tracing::info!("Writing rankings under {}", config.output.results_dir);
            Box::new(sink)
        }
    };

    Ok(sink)
}
