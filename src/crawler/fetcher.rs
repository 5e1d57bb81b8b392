//! Page fetching
//!
//! This module handles every request made against the directory:
//! - The `PageFetcher` trait the pipeline is written against
//! - The reqwest-backed `HttpPageFetcher`
//! - `ThrottledFetcher`, which bounds in-flight fetches across all terms

use crate::config::{DirectoryConfig, UserAgentConfig};
use crate::crawler::parser::extract_names;
use crate::{ConfigError, FetchError, FetchResult, RippleError};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Source of one listing page's ordered item names
///
/// Pages are 1-based. Implementations must be monotone: once a page comes
/// back empty, every higher page is empty too. Page-range discovery relies
/// on this and does not re-check it.
pub trait PageFetcher: Send + Sync {
    /// Fetches the names on `page` for `term`, empty past the last page
    fn fetch(
        &self,
        term: &str,
        page: u32,
    ) -> impl Future<Output = FetchResult<Vec<String>>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use rank_ripple::config::{DirectoryConfig, UserAgentConfig};
/// use rank_ripple::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "RankRipple".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
/// # let directory: DirectoryConfig = unimplemented!();
/// let client = build_http_client(&user_agent, &directory).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    directory: &DirectoryConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(directory.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches listing pages over HTTP from `<base-url>/<page>/<term>`
///
/// # Response handling
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Parse names; no container → empty page |
/// | HTTP 404 | Empty page (past the end of the listing) |
/// | HTTP 429, 5xx | Retry up to `retries` times |
/// | Timeout | Retry up to `retries` times |
/// | Other status | Immediate `FetchError::Status` |
/// | Connection error | Immediate `FetchError::Http` |
pub struct HttpPageFetcher {
    client: Client,
    base_url: Url,
    container_selector: String,
    item_selector: String,
    retries: u32,
    retry_delay: Duration,
}

impl HttpPageFetcher {
    pub fn new(directory: &DirectoryConfig, user_agent: &UserAgentConfig) -> crate::Result<Self> {
        let base_url = Url::parse(&directory.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(format!(
                "base_url '{}' cannot have path segments appended",
                directory.base_url
            ))
            .into());
        }

        let client = build_http_client(user_agent, directory)
            .map_err(|e| RippleError::Fetch(FetchError::Client(e)))?;

        Ok(Self {
            client,
            base_url,
            container_selector: directory.container_selector.clone(),
            item_selector: directory.item_selector.clone(),
            retries: directory.retries,
            retry_delay: Duration::from_millis(directory.retry_delay_ms),
        })
    }

    /// URL of one listing page; the empty term lists the front page
    pub fn page_url(&self, term: &str, page: u32) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&page.to_string());
            if !term.is_empty() {
                segments.push(term);
            }
        }
        url
    }

    /// Fetches a page body, retrying transient failures
    ///
    /// Returns `None` for pages the directory reports as missing.
    async fn fetch_body(&self, url: &Url) -> FetchResult<Option<String>> {
        let mut attempt = 0;
        loop {
            match self.try_fetch_body(url).await {
                Err(e) if attempt < self.retries && is_transient(&e) => {
                    attempt += 1;
                    tracing::warn!(
                        "Transient failure for {} (attempt {}/{}): {}",
                        url,
                        attempt,
                        self.retries,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                result => return result,
            }
        }
    }

    async fn try_fetch_body(&self, url: &Url) -> FetchResult<Option<String>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;
        Ok(Some(body))
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, term: &str, page: u32) -> FetchResult<Vec<String>> {
        let url = self.page_url(term, page);
        tracing::debug!("Fetching page {}: {}", page, url);

        let Some(body) = self.fetch_body(&url).await? else {
            tracing::debug!("Page {} not found, treating as empty", page);
            return Ok(Vec::new());
        };

        extract_names(&body, &self.container_selector, &self.item_selector).map_err(|message| {
            FetchError::Markup {
                url: url.to_string(),
                message,
            }
        })
    }
}

fn classify_error(url: &Url, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: e,
        }
    }
}

fn is_transient(e: &FetchError) -> bool {
    match e {
        FetchError::Timeout { .. } => true,
        FetchError::Status { status, .. } => *status == 429 || (500..600).contains(status),
        _ => false,
    }
}

/// Bounds the number of fetches in flight through one shared semaphore
pub struct ThrottledFetcher<F> {
    inner: F,
    permits: Semaphore,
}

impl<F: PageFetcher> ThrottledFetcher<F> {
    pub fn new(inner: F, max_in_flight: usize) -> Self {
        Self {
            inner,
            permits: Semaphore::new(max_in_flight.max(1)),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: PageFetcher> PageFetcher for ThrottledFetcher<F> {
    async fn fetch(&self, term: &str, page: u32) -> FetchResult<Vec<String>> {
        let _permit = self.permits.acquire().await;
        self.inner.fetch(term, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn create_test_directory(base_url: &str) -> DirectoryConfig {
        DirectoryConfig {
            label: "Listing".to_string(),
            base_url: base_url.to_string(),
            container_selector: "div.col-md-8".to_string(),
            item_selector: "span.server-name".to_string(),
            request_timeout_secs: 5,
            retries: 2,
            retry_delay_ms: 1,
        }
    }

    fn create_test_user_agent() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestPuller".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    fn fetcher(base_url: &str) -> HttpPageFetcher {
        HttpPageFetcher::new(&create_test_directory(base_url), &create_test_user_agent()).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(
            &create_test_user_agent(),
            &create_test_directory("https://listing.example.com/servers"),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_page_url() {
        let f = fetcher("https://listing.example.com/servers");
        assert_eq!(
            f.page_url("games", 3).as_str(),
            "https://listing.example.com/servers/3/games"
        );
        assert_eq!(
            f.page_url("", 1).as_str(),
            "https://listing.example.com/servers/1"
        );
    }

    #[test]
    fn test_page_url_with_trailing_slash_and_spaces() {
        let f = fetcher("https://listing.example.com/servers/");
        assert_eq!(
            f.page_url("board games", 2).as_str(),
            "https://listing.example.com/servers/2/board%20games"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = HttpPageFetcher::new(
            &create_test_directory("mailto:admin@example.com"),
            &create_test_user_agent(),
        );
        assert!(matches!(result, Err(RippleError::Config(_))));
    }

    #[test]
    fn test_transient_classification() {
        let status = |status| FetchError::Status {
            url: "u".to_string(),
            status,
        };
        assert!(is_transient(&status(429)));
        assert!(is_transient(&status(503)));
        assert!(!is_transient(&status(403)));
        assert!(is_transient(&FetchError::Timeout {
            url: "u".to_string()
        }));
    }

    struct SlowFetcher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl PageFetcher for SlowFetcher {
        async fn fetch(&self, _term: &str, page: u32) -> FetchResult<Vec<String>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![format!("p{}", page)])
        }
    }

    #[tokio::test]
    async fn test_throttle_bounds_in_flight_fetches() {
        let throttled = Arc::new(ThrottledFetcher::new(
            SlowFetcher {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            },
            2,
        ));

        let fetches = (1..=8).map(|page| {
            let throttled = Arc::clone(&throttled);
            async move { throttled.fetch("t", page).await }
        });
        let results = futures::future::join_all(fetches).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(throttled.inner().peak.load(Ordering::SeqCst), 2);
    }
}
