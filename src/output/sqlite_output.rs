//! Database sink
//!
//! Buffers a pull's rankings in memory and writes them to the storage
//! backend in one transaction on commit, so a pull is either fully visible
//! or not visible at all.

use crate::output::traits::{Sink, SinkKind, SinkResult};
use crate::ranking::{Pull, Ranking};
use crate::storage::RankingStore;

/// Sink that records pulls in a [`RankingStore`]
pub struct DatabaseSink<S: RankingStore> {
    storage: S,
    config_hash: String,
    staged: Vec<Ranking>,
}

impl<S: RankingStore> DatabaseSink<S> {
    /// Creates a database sink
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to record pulls in
    /// * `config_hash` - Hash of the configuration the pull runs under
    pub fn new(storage: S, config_hash: &str) -> Self {
        Self {
            storage,
            config_hash: config_hash.to_string(),
            staged: Vec::new(),
        }
    }

    /// Number of rankings waiting for commit
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: RankingStore> Sink for DatabaseSink<S> {
    fn kind(&self) -> SinkKind {
        SinkKind::Database
    }

    fn max_pull_id(&self) -> SinkResult<Option<i64>> {
        Ok(self.storage.max_pull_id()?)
    }

    fn stage_ranking(&mut self, pull: &Pull, ranking: &Ranking) -> SinkResult<()> {
        tracing::debug!(
            "Staging {} entries for term '{}' in pull {}",
            ranking.len(),
            ranking.term(),
            pull.id
        );
        self.staged.push(ranking.clone());
        Ok(())
    }

    fn commit(&mut self, pull: &Pull) -> SinkResult<()> {
        let staged = std::mem::take(&mut self.staged);
        self.storage
            .record_pull(pull, &self.config_hash, &staged)?;

        tracing::info!(
            "Committed pull {} ({} terms, {} entries)",
            pull.id,
            staged.len(),
            staged.iter().map(Ranking::len).sum::<usize>()
        );
        Ok(())
    }
}
