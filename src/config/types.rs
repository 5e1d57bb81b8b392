use crate::output::SinkKind;
use crate::ranking::{LastPage, PageSpec};
use crate::ConfigError;
use serde::Deserialize;

/// Main configuration structure for Rank-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pull: PullConfig,
    pub directory: DirectoryConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Page bounds every term of a pull is collected over
    pub fn page_spec(&self) -> Result<PageSpec, ConfigError> {
        PageSpec::new(self.pull.first_page, self.pull.max_pages)
    }
}

/// What to pull and where to send it
#[derive(Debug, Clone, Deserialize)]
pub struct PullConfig {
    /// Search terms to rank; the empty term is the directory front page
    #[serde(rename = "search-terms", default = "default_search_terms")]
    pub search_terms: Vec<String>,

    /// Last page to collect, or "all" to discover it
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: LastPage,

    /// First page to collect
    #[serde(rename = "first-page", default = "default_first_page")]
    pub first_page: u32,

    /// Sink the rankings are routed to
    #[serde(rename = "query-type", default)]
    pub query_type: SinkKind,

    /// Maximum number of page fetches in flight across all terms
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,
}

/// The paginated directory being ranked
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Name printed in ranking headers
    #[serde(default = "default_label")]
    pub label: String,

    /// Listing root; pages live at `<base-url>/<page>/<term>`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Selector for the element holding the ranked list
    #[serde(
        rename = "container-selector",
        default = "default_container_selector"
    )]
    pub container_selector: String,

    /// Selector for each ranked item inside the container
    #[serde(rename = "item-selector", default = "default_item_selector")]
    pub item_selector: String,

    /// Per-request timeout (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,

    /// Retries for timeouts, HTTP 429 and 5xx responses
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Delay between retries (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Sink locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Directory for `.out` files written by the file sink
    #[serde(rename = "results-dir", default = "default_results_dir")]
    pub results_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            results_dir: default_results_dir(),
        }
    }
}

fn default_search_terms() -> Vec<String> {
    vec![String::new()]
}

fn default_max_pages() -> LastPage {
    LastPage::Bounded(1)
}

fn default_first_page() -> u32 {
    1
}

fn default_max_concurrent_fetches() -> u32 {
    8
}

fn default_label() -> String {
    "Discord.me".to_string()
}

fn default_container_selector() -> String {
    "div.col-md-8".to_string()
}

fn default_item_selector() -> String {
    "span.server-name".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_database_path() -> String {
    "./rankings.db".to_string()
}

fn default_results_dir() -> String {
    "results".to_string()
}
