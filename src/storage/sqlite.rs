//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RankingStore trait.

use crate::ranking::{PageRange, Pull, Ranking};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RankingStore, StorageError, StorageResult};
use crate::storage::PullRecord;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and applies the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let unreachable = |source| StorageError::Unreachable {
            path: path.display().to_string(),
            source,
        };

        let conn = Connection::open(path).map_err(unreachable)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )
        .map_err(unreachable)?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl RankingStore for SqliteStorage {
    fn max_pull_id(&self) -> StorageResult<Option<i64>> {
        // Older databases only have the rankings table.
        let max = self.conn.query_row(
            "SELECT MAX(id) FROM (
                SELECT MAX(id) AS id FROM pulls
                UNION ALL
                SELECT MAX(pullnumber) AS id FROM rankings
            )",
            [],
            |row| row.get::<_, Option<i64>>(0),
        )?;
        Ok(max)
    }

    fn record_pull(
        &mut self,
        pull: &Pull,
        config_hash: &str,
        rankings: &[Ranking],
    ) -> StorageResult<()> {
        let pulltime = pull.timestamp();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO pulls (id, pulltime, config_hash, committed_at) VALUES (?1, ?2, ?3, ?4)",
            params![pull.id, pulltime, config_hash, Utc::now().to_rfc3339()],
        )?;

        {
            let mut term_stmt = tx.prepare(
                "INSERT INTO pull_terms (pullnumber, searchterm, first_page, last_page, entry_count)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            let mut entry_stmt = tx.prepare(
                "INSERT INTO rankings (pullnumber, pulltime, searchterm, servername, rank)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for ranking in rankings {
                let pages = ranking.pages();
                term_stmt.execute(params![
                    pull.id,
                    ranking.term(),
                    pages.first,
                    pages.last,
                    ranking.len() as i64
                ])?;

                for entry in ranking.entries() {
                    entry_stmt.execute(params![
                        pull.id,
                        pulltime,
                        ranking.term(),
                        entry.name,
                        entry.position
                    ])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn latest_pull(&self) -> StorageResult<Option<PullRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT p.id, p.pulltime, p.config_hash, p.committed_at,
                        (SELECT COUNT(*) FROM pull_terms t WHERE t.pullnumber = p.id)
                 FROM pulls p ORDER BY p.id DESC LIMIT 1",
                [],
                |row| {
                    Ok(PullRecord {
                        id: row.get(0)?,
                        pulltime: row.get(1)?,
                        config_hash: row.get(2)?,
                        committed_at: row.get(3)?,
                        term_count: row.get::<_, i64>(4)? as u64,
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    fn load_rankings(&self, pull_id: i64) -> StorageResult<Vec<Ranking>> {
        let exists: Option<i64> = self
            .conn
            .query_row("SELECT id FROM pulls WHERE id = ?1", params![pull_id], |row| {
                row.get(0)
            })
            .optional()?;
        if exists.is_none() {
            return Err(StorageError::PullNotFound(pull_id));
        }

        let mut term_stmt = self.conn.prepare(
            "SELECT searchterm, first_page, last_page FROM pull_terms
             WHERE pullnumber = ?1 ORDER BY rowid",
        )?;
        let terms = term_stmt
            .query_map(params![pull_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    PageRange::new(row.get(1)?, row.get(2)?),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut entry_stmt = self.conn.prepare(
            "SELECT servername FROM rankings
             WHERE pullnumber = ?1 AND searchterm = ?2 ORDER BY rank",
        )?;

        let mut rankings = Vec::with_capacity(terms.len());
        for (term, pages) in terms {
            let names = entry_stmt
                .query_map(params![pull_id, term], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            rankings.push(Ranking::from_pages(&term, pages, vec![names]));
        }

        Ok(rankings)
    }

    fn count_pulls(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pulls", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
