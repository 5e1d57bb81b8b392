//! Pull orchestration
//!
//! A pull is one run over every configured term. This module:
//! - Allocates the pull id and timestamp shared by every term
//! - Collects all terms concurrently under one fetch limit
//! - Stages results with the sink from a single task
//! - Commits once, after every term has been staged

use crate::config::Config;
use crate::crawler::collector::RankCollector;
use crate::crawler::fetcher::PageFetcher;
use crate::output::{Sink, SinkError};
use crate::ranking::{display_term, PageRange, PageSpec, Pull};
use crate::{ConfigResult, ExitStatus, FetchError};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use thiserror::Error;

/// The terms and page bounds of one pull
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullContext {
    pub terms: Vec<String>,
    pub page_spec: PageSpec,
}

impl PullContext {
    /// Creates a pull context; repeated terms are kept once, at their first
    /// position
    pub fn new<I, T>(terms: I, page_spec: PageSpec) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for term in terms {
            let term = term.into();
            if unique.contains(&term) {
                tracing::warn!("Ignoring repeated search term '{}'", display_term(&term));
                continue;
            }
            unique.push(term);
        }

        Self {
            terms: unique,
            page_spec,
        }
    }

    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        Ok(Self::new(
            config.pull.search_terms.iter().cloned(),
            config.page_spec()?,
        ))
    }
}

/// Why a term did not make it into the pull
#[derive(Debug, Error)]
pub enum TermFailure {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("sink rejected ranking: {0}")]
    Sink(#[from] SinkError),
}

/// Result of one term within a pull
#[derive(Debug)]
pub enum TermStatus {
    Recorded { entries: usize, pages: PageRange },
    Failed(TermFailure),
}

#[derive(Debug)]
pub struct TermOutcome {
    pub term: String,
    pub status: TermStatus,
}

impl TermOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self.status, TermStatus::Recorded { .. })
    }
}

/// Outcome of a finished pull, one entry per term in configured order
#[derive(Debug)]
pub struct PullReport {
    pub pull: Pull,
    pub outcomes: Vec<TermOutcome>,
    pub committed: bool,
}

impl PullReport {
    pub fn recorded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_recorded()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &TermOutcome> {
        self.outcomes.iter().filter(|o| !o.is_recorded())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// Total entries recorded across all terms
    pub fn total_entries(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                TermStatus::Recorded { entries, .. } => entries,
                TermStatus::Failed(_) => 0,
            })
            .sum()
    }

    /// Exit status for this pull
    ///
    /// | Outcome | Status |
    /// |---------|--------|
    /// | Every term recorded | `Success` |
    /// | Some terms recorded | `PartialPull` |
    /// | No term recorded, any fetch failure | `FetchUnavailable` |
    /// | No term recorded, only sink failures | `SinkRejected` |
    pub fn exit_status(&self) -> ExitStatus {
        let failed = self.failed_count();
        if failed == 0 {
            return ExitStatus::Success;
        }
        if self.recorded() > 0 {
            return ExitStatus::PartialPull;
        }

        let any_fetch_failure = self
            .failed()
            .any(|o| matches!(o.status, TermStatus::Failed(TermFailure::Fetch(_))));
        if any_fetch_failure {
            ExitStatus::FetchUnavailable
        } else {
            ExitStatus::SinkRejected
        }
    }
}

/// Runs pulls against one sink
pub struct PullOrchestrator<F, S> {
    collector: RankCollector<F>,
    sink: S,
}

impl<F: PageFetcher, S: Sink> PullOrchestrator<F, S> {
    pub fn new(collector: RankCollector<F>, sink: S) -> Self {
        Self { collector, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs one pull stamped with the current time
    pub async fn run(&mut self, context: &PullContext) -> crate::Result<PullReport> {
        self.run_at(context, Utc::now()).await
    }

    /// Runs one pull stamped with `issued_at`
    ///
    /// # Returns
    ///
    /// * `Ok(PullReport)` - Every term was attempted; failed terms are in
    ///   the report
    /// * `Err(RippleError)` - The sink could not allocate the pull id, a
    ///   transactional sink rejected a ranking, or the commit failed. Nothing
    ///   from this pull is visible in that case.
    pub async fn run_at(
        &mut self,
        context: &PullContext,
        issued_at: DateTime<Utc>,
    ) -> crate::Result<PullReport> {
        let pull = Pull::next_after(self.sink.max_pull_id()?, issued_at);
        tracing::info!(
            "Starting pull {} at {} ({} terms, {} sink)",
            pull.id,
            pull.timestamp(),
            context.terms.len(),
            self.sink.kind()
        );

        let collector = &self.collector;
        let collected = join_all(context.terms.iter().map(|term| async move {
            (term, collector.collect(term, context.page_spec).await)
        }))
        .await;

        let mut outcomes = Vec::with_capacity(collected.len());
        for (term, result) in collected {
            let status = match result {
                Ok(ranking) => match self.sink.stage_ranking(&pull, &ranking) {
                    Ok(()) => {
                        tracing::info!(
                            "Recorded {} entries for '{}' ({})",
                            ranking.len(),
                            display_term(term),
                            ranking.pages()
                        );
                        TermStatus::Recorded {
                            entries: ranking.len(),
                            pages: ranking.pages(),
                        }
                    }
                    Err(e) if self.sink.kind().is_transactional() => {
                        tracing::error!(
                            "Sink rejected '{}', abandoning pull {}: {}",
                            display_term(term),
                            pull.id,
                            e
                        );
                        return Err(e.into());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to write '{}': {}", display_term(term), e);
                        TermStatus::Failed(TermFailure::Sink(e))
                    }
                },
                Err(e) => {
                    tracing::warn!("Term '{}' failed: {}", display_term(term), e);
                    TermStatus::Failed(TermFailure::Fetch(e))
                }
            };

            outcomes.push(TermOutcome {
                term: term.clone(),
                status,
            });
        }

        let mut report = PullReport {
            pull,
            outcomes,
            committed: false,
        };

        if report.recorded() == 0 {
            tracing::error!(
                "Pull {} recorded no terms, nothing committed",
                report.pull.id
            );
            return Ok(report);
        }

        self.sink.commit(&report.pull)?;
        report.committed = true;

        tracing::info!(
            "Pull {} complete: {} terms recorded, {} failed, {} entries",
            report.pull.id,
            report.recorded(),
            report.failed_count(),
            report.total_entries()
        );

        Ok(report)
    }
}
