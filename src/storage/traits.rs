//! Storage traits and error types
//!
//! This module defines the trait interface for ranking storage backends and
//! associated error types.

use crate::ranking::{Pull, Ranking};
use crate::storage::PullRecord;
use crate::ExitStatus;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot open database {path}: {source}")]
    Unreachable {
        path: String,
        source: rusqlite::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Pull not found: {0}")]
    PullNotFound(i64),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl StorageError {
    /// Distinguishes a database that cannot be reached from one that
    /// refused a statement
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Unreachable { .. } => ExitStatus::SinkUnreachable,
            _ => ExitStatus::SinkRejected,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for ranking storage backends
pub trait RankingStore {
    /// Highest pull id recorded so far, if any
    fn max_pull_id(&self) -> StorageResult<Option<i64>>;

    /// Records a pull and all of its rankings as one atomic unit
    ///
    /// Either every ranking of the pull becomes visible or none does.
    /// Recording a pull id that already exists fails.
    fn record_pull(
        &mut self,
        pull: &Pull,
        config_hash: &str,
        rankings: &[Ranking],
    ) -> StorageResult<()>;

    /// The most recently committed pull
    fn latest_pull(&self) -> StorageResult<Option<PullRecord>>;

    /// Rankings of a pull, in the order their terms were recorded
    fn load_rankings(&self, pull_id: i64) -> StorageResult<Vec<Ranking>>;

    /// Number of committed pulls
    fn count_pulls(&self) -> StorageResult<u64>;
}
