//! Last-page discovery
//!
//! Finds the highest non-empty page for a term with an exponential probe
//! followed by a bisection, so a listing of `p` pages costs `O(log p)`
//! fetches instead of walking every page.

use crate::crawler::fetcher::PageFetcher;
use crate::{FetchError, FetchResult};

/// First page probed during the doubling phase
pub const INITIAL_PROBE_PAGE: u32 = 32;

/// Highest page the doubling phase may probe before giving up
pub const MAX_PROBE_PAGE: u32 = 1 << 20;

/// Discovers the last non-empty page of a term's listing
pub struct PageRangeScanner<'a, F> {
    fetcher: &'a F,
}

impl<'a, F: PageFetcher> PageRangeScanner<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Returns the highest page with at least one result, or 0 if none has
    ///
    /// Relies on the fetcher being monotone. Fails with
    /// `FetchError::RangeUnbounded` if page `MAX_PROBE_PAGE` still has
    /// results, and with the fetch error of any probe that fails.
    pub async fn find_last_page(&self, term: &str) -> FetchResult<u32> {
        // lower is always 0 or a non-empty page, upper is always an empty page
        let mut lower = 0;
        let mut upper = INITIAL_PROBE_PAGE;

        while self.has_results(term, upper).await? {
            if upper >= MAX_PROBE_PAGE {
                return Err(FetchError::RangeUnbounded {
                    term: term.to_string(),
                    page: upper,
                });
            }
            lower = upper;
            upper *= 2;
        }

        while upper - lower > 1 {
            let mid = lower + (upper - lower) / 2;
            if self.has_results(term, mid).await? {
                lower = mid;
            } else {
                upper = mid;
            }
        }

        tracing::debug!("Last page for '{}' is {}", term, lower);
        Ok(lower)
    }

    async fn has_results(&self, term: &str, page: u32) -> FetchResult<bool> {
        let names = self.fetcher.fetch(term, page).await?;
        tracing::trace!("Probe page {} for '{}': {} results", page, term, names.len());
        Ok(!names.is_empty())
    }
}
