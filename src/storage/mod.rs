//! Storage module for persisting pulls
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Pull id allocation lookups
//! - Atomic recording of a pull's rankings
//! - Reading committed pulls back for reports

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{RankingStore, StorageError, StorageResult};

use crate::ranking::Pull;
use chrono::{DateTime, Utc};

/// Represents a committed pull in the database
#[derive(Debug, Clone)]
pub struct PullRecord {
    pub id: i64,
    pub pulltime: String,
    pub config_hash: String,
    pub committed_at: String,
    pub term_count: u64,
}

impl PullRecord {
    /// Rebuilds the pull tag from the stored timestamp
    pub fn pull(&self) -> StorageResult<Pull> {
        let issued_at = DateTime::parse_from_rfc3339(&self.pulltime)
            .map_err(|e| {
                StorageError::Corrupt(format!(
                    "pull {} has invalid pulltime '{}': {}",
                    self.id, self.pulltime, e
                ))
            })?
            .with_timezone(&Utc);

        Ok(Pull {
            id: self.id,
            issued_at,
        })
    }
}
