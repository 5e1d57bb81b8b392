use crate::config::types::{Config, DirectoryConfig, OutputConfig, PullConfig, UserAgentConfig};
use crate::crawler::MAX_PROBE_PAGE;
use crate::output::SinkKind;
use crate::ranking::{LastPage, PageSpec};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_pull_config(&config.pull)?;
    validate_directory_config(&config.directory)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output, config.pull.query_type)?;
    Ok(())
}

/// Validates search terms, page bounds and concurrency
fn validate_pull_config(config: &PullConfig) -> Result<(), ConfigError> {
    if config.search_terms.is_empty() {
        return Err(ConfigError::Validation(
            "search_terms cannot be empty (use [\"\"] for the front page)".to_string(),
        ));
    }

    PageSpec::new(config.first_page, config.max_pages)?;

    if let LastPage::Bounded(last) = config.max_pages {
        if last > MAX_PROBE_PAGE {
            return Err(ConfigError::InvalidPageSpec(format!(
                "max_pages must be at most {}, got {}",
                MAX_PROBE_PAGE, last
            )));
        }
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    Ok(())
}

/// Validates the directory endpoint and its selectors
fn validate_directory_config(config: &DirectoryConfig) -> Result<(), ConfigError> {
    if config.label.trim().is_empty() {
        return Err(ConfigError::Validation("label cannot be empty".to_string()));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' cannot have path segments appended",
            config.base_url
        )));
    }

    validate_selector(&config.container_selector)?;
    validate_selector(&config.item_selector)?;

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.retries > 10 {
        return Err(ConfigError::Validation(format!(
            "retries must be <= 10, got {}",
            config.retries
        )));
    }

    Ok(())
}

fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates the location the selected sink writes to
fn validate_output_config(config: &OutputConfig, kind: SinkKind) -> Result<(), ConfigError> {
    match kind {
        SinkKind::Database if config.database_path.is_empty() => Err(ConfigError::Validation(
            "database_path cannot be empty for the database sink".to_string(),
        )),
        SinkKind::File if config.results_dir.is_empty() => Err(ConfigError::Validation(
            "results_dir cannot be empty for the file sink".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> DirectoryConfig {
        DirectoryConfig {
            label: "Listing".to_string(),
            base_url: "https://listing.example.com/servers".to_string(),
            container_selector: "div.col-md-8".to_string(),
            item_selector: "span.server-name".to_string(),
            request_timeout_secs: 30,
            retries: 2,
            retry_delay_ms: 500,
        }
    }

    fn pull() -> PullConfig {
        PullConfig {
            search_terms: vec!["games".to_string()],
            max_pages: LastPage::Unbounded,
            first_page: 1,
            query_type: SinkKind::Console,
            max_concurrent_fetches: 8,
        }
    }

    #[test]
    fn test_validate_pull_config() {
        assert!(validate_pull_config(&pull()).is_ok());

        let mut no_terms = pull();
        no_terms.search_terms.clear();
        assert!(validate_pull_config(&no_terms).is_err());

        let mut inverted = pull();
        inverted.first_page = 5;
        inverted.max_pages = LastPage::Bounded(2);
        assert!(matches!(
            validate_pull_config(&inverted),
            Err(ConfigError::InvalidPageSpec(_))
        ));

        let mut zero_first = pull();
        zero_first.first_page = 0;
        assert!(validate_pull_config(&zero_first).is_err());

        let mut largest = pull();
        largest.max_pages = LastPage::Bounded(MAX_PROBE_PAGE);
        assert!(validate_pull_config(&largest).is_ok());

        let mut huge = pull();
        huge.max_pages = LastPage::Bounded(u32::MAX);
        assert!(matches!(
            validate_pull_config(&huge),
            Err(ConfigError::InvalidPageSpec(_))
        ));
    }

    #[test]
    fn test_validate_directory_config() {
        assert!(validate_directory_config(&directory()).is_ok());

        let mut bad_url = directory();
        bad_url.base_url = "not a url".to_string();
        assert!(matches!(
            validate_directory_config(&bad_url),
            Err(ConfigError::InvalidUrl(_))
        ));

        let mut ftp = directory();
        ftp.base_url = "ftp://listing.example.com/servers".to_string();
        assert!(validate_directory_config(&ftp).is_err());

        let mut bad_selector = directory();
        bad_selector.item_selector = "span[".to_string();
        assert!(matches!(
            validate_directory_config(&bad_selector),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_validate_output_for_sink() {
        let empty = OutputConfig {
            database_path: String::new(),
            results_dir: String::new(),
        };

        assert!(validate_output_config(&empty, SinkKind::Console).is_ok());
        assert!(validate_output_config(&empty, SinkKind::Database).is_err());
        assert!(validate_output_config(&empty, SinkKind::File).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("a@b@example.com").is_err());
    }
}
