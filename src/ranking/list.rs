use crate::ranking::PageRange;

/// Label used in place of the empty search term
pub const FRONT_PAGE_LABEL: &str = "Front Page";

/// Returns a printable name for a search term
///
/// The empty term lists the directory's unfiltered front page.
pub fn display_term(term: &str) -> &str {
    if term.is_empty() {
        FRONT_PAGE_LABEL
    } else {
        term
    }
}

/// One ranked item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based rank within the whole ranking
    pub position: u32,
    pub name: String,
}

/// Rank-ordered names for one search term across one page range
///
/// Positions are assigned from sequence order when the ranking is built, so
/// they always run `1..=len` in page order, then within-page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    term: String,
    pages: PageRange,
    entries: Vec<Entry>,
}

impl Ranking {
    /// A ranking with no entries, e.g. for a term without results
    pub fn empty(term: &str, pages: PageRange) -> Self {
        Self {
            term: term.to_string(),
            pages,
            entries: Vec::new(),
        }
    }

    /// Flattens per-page name lists into one ranking
    ///
    /// `per_page` must be ordered by ascending page index.
    pub fn from_pages(term: &str, pages: PageRange, per_page: Vec<Vec<String>>) -> Self {
        let entries = per_page
            .into_iter()
            .flatten()
            .zip(1u32..)
            .map(|(name, position)| Entry { position, name })
            .collect();

        Self {
            term: term.to_string(),
            pages,
            entries,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn pages(&self) -> PageRange {
        self.pages
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in rank order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}
