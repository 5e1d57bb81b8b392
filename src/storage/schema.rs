//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Rank-Ripple database.

/// SQL schema for the database
///
/// `rankings` keeps the historical one-row-per-entry layout. `pulls` and
/// `pull_terms` record each committed pull and every term it covered,
/// including terms whose ranking was empty.
pub const SCHEMA_SQL: &str = r#"
-- One row per committed pull
CREATE TABLE IF NOT EXISTS pulls (
    id INTEGER PRIMARY KEY,
    pulltime TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    committed_at TEXT NOT NULL
);

-- Terms covered by each pull, with the page range they were collected over
CREATE TABLE IF NOT EXISTS pull_terms (
    pullnumber INTEGER NOT NULL REFERENCES pulls(id),
    searchterm TEXT NOT NULL,
    first_page INTEGER NOT NULL,
    last_page INTEGER NOT NULL,
    entry_count INTEGER NOT NULL,
    PRIMARY KEY (pullnumber, searchterm)
);

-- One row per ranked entry
CREATE TABLE IF NOT EXISTS rankings (
    pullnumber INTEGER NOT NULL,
    pulltime TEXT NOT NULL,
    searchterm TEXT NOT NULL,
    servername TEXT NOT NULL,
    rank INTEGER NOT NULL,
    PRIMARY KEY (pullnumber, pulltime, searchterm, servername, rank)
);

CREATE INDEX IF NOT EXISTS idx_rankings_pull_term ON rankings(pullnumber, searchterm);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
