use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig};
use crate::ConfigError;
use std::fmt::Display;
use std::ops::RangeInclusive;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn check_range<T>(name: &str, value: T, range: RangeInclusive<T>) -> Result<(), ConfigError>
where
    T: PartialOrd + Display,
{
    if !range.contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )));
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    check_range("top_n", config.top_n, 1..=500)?;
    check_range("max_depth", config.max_depth, 1..=10)?;
    check_range(
        "max_comments_per_story",
        config.max_comments_per_story,
        1..=5000,
    )?;
    check_range("concurrency", config.concurrency, 1..=32)?;
    check_range("max_body_chars", config.max_body_chars, 1000..=50_000)?;
    check_range("batch_pause_ms", config.batch_pause_ms, 0..=5000)?;
    check_range(
        "article_slice_chars",
        config.article_slice_chars,
        1000..=20_000,
    )?;
    Ok(())
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    check_range("timeout_ms", config.timeout_ms, 1000..=60_000)?;
    check_range("retries", config.retries, 0..=5)?;
    check_range("backoff_ms", config.backoff_ms, 100..=5000)?;

    if config.max_backoff_ms < config.backoff_ms {
        return Err(ConfigError::Validation(format!(
            "max_backoff_ms ({}) must be >= backoff_ms ({})",
            config.max_backoff_ms, config.backoff_ms
        )));
    }

    for status in &config.retry_statuses {
        check_range("retry status", *status, 100..=599)?;
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_crawler_ranges() {
        let mut config = Config::default();
        config.crawler.max_depth = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.max_depth = 11;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.max_comments_per_story = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.concurrency = 33;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.max_body_chars = 999;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_http_validation() {
        let mut config = Config::default();
        config.http.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));

        let mut config = Config::default();
        config.http.base_url = "ftp://example.com".to_string();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.http.retries = 6;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.http.max_backoff_ms = 100;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.http.retry_statuses = vec![503, 42];
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_output_validation() {
        let mut config = Config::default();
        config.output.data_dir = String::new();
        assert!(validate(&config).is_err());
    }
}
