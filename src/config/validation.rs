use crate::config::types::{Config, CrawlConfig};
use crate::crawler::{Limit, MAX_CONCURRENCY};
use crate::ConfigError;

/// Validates the entire configuration
///
/// Filters and scorers are validated by building them, so a config that
/// passes here always produces a crawler.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_http_config(config)?;

    for filter in &config.filters {
        filter.build()?;
    }

    if let Some(scorer) = &config.scorer {
        scorer.build()?;
    }

    Ok(())
}

fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if let Some(max_depth) = &config.max_depth {
        max_depth.to_limit("max-depth")?;
    }

    if let Some(max_pages) = &config.max_pages {
        if max_pages.to_limit("max-pages")? == Limit::Bounded(0) {
            return Err(ConfigError::Validation(
                "max-pages must be at least 1".to_string(),
            ));
        }
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be >= 1, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

fn validate_http_config(config: &Config) -> Result<(), ConfigError> {
    let http = &config.http;

    if http.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if http.timeout_secs == 0 || http.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "HTTP timeouts must be at least one second".to_string(),
        ));
    }

    Ok(())
}

/// Validates a domain pattern (supports a leading `*.` wildcard)
///
/// Single-label hosts such as `localhost` are accepted.
pub(crate) fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
