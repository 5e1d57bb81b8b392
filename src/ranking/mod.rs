//! Ranking data model
//!
//! This module defines the values that flow through a pull.
//!
//! # Components
//!
//! - `PageSpec` / `LastPage`: which pages to collect for a term
//! - `PageRange`: the resolved page bounds a ranking was built from
//! - `Ranking` / `Entry`: the rank-ordered names for one search term
//! - `Pull`: the (id, timestamp) tag shared by every ranking of one run

mod list;
mod page_spec;
mod pull;

// Re-export main types
pub use list::{display_term, Entry, Ranking, FRONT_PAGE_LABEL};
pub use page_spec::{LastPage, PageRange, PageSpec};
pub use pull::Pull;
