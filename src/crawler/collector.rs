//! Ranking collection for a single term
//!
//! Pages are fetched concurrently; results are placed by page index rather
//! than by completion order, so the flattened ranking matches what a strictly
//! sequential walk of the pages would produce.

use crate::crawler::fetcher::{PageFetcher, ThrottledFetcher};
use crate::crawler::scanner::PageRangeScanner;
use crate::ranking::{display_term, LastPage, PageRange, PageSpec, Ranking};
use crate::FetchResult;
use futures::future::try_join_all;

/// Collects one term's ranking across a page range
///
/// All fetches go through one throttle, so concurrent collections for
/// different terms share the same in-flight limit.
pub struct RankCollector<F> {
    fetcher: ThrottledFetcher<F>,
}

impl<F: PageFetcher> RankCollector<F> {
    /// Creates a collector allowing at most `max_concurrent_fetches` fetches
    /// in flight at once
    pub fn new(fetcher: F, max_concurrent_fetches: usize) -> Self {
        Self {
            fetcher: ThrottledFetcher::new(fetcher, max_concurrent_fetches),
        }
    }

    pub fn fetcher(&self) -> &F {
        self.fetcher.inner()
    }

    /// Resolves the page range for `term`
    ///
    /// An unbounded spec scans for the last non-empty page first.
    pub async fn resolve_range(&self, term: &str, spec: PageSpec) -> FetchResult<PageRange> {
        let last = match spec.last {
            LastPage::Bounded(last) => last,
            LastPage::Unbounded => {
                let last = PageRangeScanner::new(&self.fetcher)
                    .find_last_page(term)
                    .await?;
                tracing::info!("'{}' has {} pages of results", display_term(term), last);
                last
            }
        };

        Ok(PageRange::new(spec.first, last))
    }

    /// Collects the ranking for `term`
    ///
    /// Any failed page fails the whole term; the remaining in-flight fetches
    /// for that term are dropped. Other terms are unaffected.
    pub async fn collect(&self, term: &str, spec: PageSpec) -> FetchResult<Ranking> {
        let pages = self.resolve_range(term, spec).await?;
        if pages.is_empty() {
            tracing::debug!("No pages to collect for '{}'", display_term(term));
            return Ok(Ranking::empty(term, pages));
        }

        tracing::debug!("Collecting {} for '{}'", pages, display_term(term));

        let per_page = try_join_all(pages.pages().map(|page| self.fetcher.fetch(term, page))).await?;

        let ranking = Ranking::from_pages(term, pages, per_page);
        tracing::debug!(
            "Collected {} entries for '{}'",
            ranking.len(),
            display_term(term)
        );
        Ok(ranking)
    }
}
