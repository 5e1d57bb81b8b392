//! Reports on committed pulls
//!
//! This module reads pulls back out of the storage layer for the
//! `--show-latest` mode.

use crate::output::console::format_ranking;
use crate::ranking::{Pull, Ranking};
use crate::storage::{PullRecord, RankingStore, StorageResult};

/// A committed pull with its rankings
#[derive(Debug, Clone)]
pub struct PullSummary {
    pub record: PullRecord,
    pub pull: Pull,
    pub rankings: Vec<Ranking>,
}

impl PullSummary {
    /// Total number of ranked entries across all terms
    pub fn total_entries(&self) -> usize {
        self.rankings.iter().map(Ranking::len).sum()
    }
}

/// Loads the most recently committed pull, if there is one
pub fn load_latest_pull(storage: &dyn RankingStore) -> StorageResult<Option<PullSummary>> {
    let Some(record) = storage.latest_pull()? else {
        return Ok(None);
    };

    let pull = record.pull()?;
    let rankings = storage.load_rankings(record.id)?;

    Ok(Some(PullSummary {
        record,
        pull,
        rankings,
    }))
}

/// Renders a pull summary in the console ranking format
pub fn format_pull_summary(label: &str, summary: &PullSummary) -> String {
    let mut text = format!(
        "=== Pull {} ({} terms, {} entries, config {}) ===\n",
        summary.record.id,
        summary.record.term_count,
        summary.total_entries(),
        short_hash(&summary.record.config_hash)
    );

    for ranking in &summary.rankings {
        text.push('\n');
        text.push_str(&format_ranking(label, &summary.pull, ranking));
    }

    text
}

/// Prints a pull summary to stdout
pub fn print_pull_summary(label: &str, summary: &PullSummary) {
    print!("{}", format_pull_summary(label, summary));
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}
