//! Rank-Ripple: a ranked-listing puller
//!
//! This crate periodically pulls ranked listing pages from a paginated web
//! directory, flattens them into one ranking per search term and records every
//! term of a run under a single numbered pull.

pub mod config;
pub mod crawler;
pub mod output;
pub mod ranking;
pub mod storage;

use thiserror::Error;

/// Main error type for Rank-Ripple operations
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Sink error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

impl RippleError {
    /// Maps the error onto the process exit status reported to operators
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Config(_) => ExitStatus::ConfigInvalid,
            Self::Fetch(_) => ExitStatus::FetchUnavailable,
            Self::Sink(e) => e.exit_status(),
            Self::Storage(e) => e.exit_status(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector in config: {0}")]
    InvalidSelector(String),

    #[error("Invalid page spec: {0}")]
    InvalidPageSpec(String),
}

/// Errors raised while fetching a single listing page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Markup error for {url}: {message}")]
    Markup { url: String, message: String },

    #[error("Page range for term '{term}' still had results at page {page}")]
    RangeUnbounded { term: String, page: u32 },

    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

/// Process exit statuses, one per failure mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    Internal = 1,
    ConfigInvalid = 2,
    FetchUnavailable = 3,
    SinkUnreachable = 4,
    SinkRejected = 5,
    PartialPull = 6,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}

/// Result type alias for Rank-Ripple operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for page fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{PageFetcher, PageRangeScanner, PullOrchestrator, RankCollector};
pub use ranking::{Entry, LastPage, PageRange, PageSpec, Pull, Ranking};
