use crate::config::types::Config;
use crate::ConfigError;

/// Upper bound on `<url>` entries per file set by the sitemap protocol
const PROTOCOL_MAX_URLS: usize = 50_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_limits(config)?;
    validate_http(config)?;
    validate_exclude_patterns(&config.exclude_patterns)?;
    validate_extensions(&config.valid_extensions)?;
    Ok(())
}

/// Validates the crawl and partitioning limits
fn validate_limits(config: &Config) -> Result<(), ConfigError> {
    if config.max_urls_per_sitemap < 1 || config.max_urls_per_sitemap > PROTOCOL_MAX_URLS {
        return Err(ConfigError::Validation(format!(
            "max_urls_per_sitemap must be between 1 and {}, got {}",
            PROTOCOL_MAX_URLS, config.max_urls_per_sitemap
        )));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if !config.requests_per_second.is_finite() || config.requests_per_second <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "requests_per_second must be a positive number, got {}",
            config.requests_per_second
        )));
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_http(config: &Config) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.robots_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "robots_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// An empty pattern would match every URL
fn validate_exclude_patterns(patterns: &[String]) -> Result<(), ConfigError> {
    if patterns.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::Validation(
            "exclude_patterns cannot contain an empty pattern".to_string(),
        ));
    }
    Ok(())
}

/// Validates extension entries (`".html"`, `"php"` and `""` are all accepted)
fn validate_extensions(extensions: &[String]) -> Result<(), ConfigError> {
    for ext in extensions {
        let bare = ext.trim_start_matches('.');
        if !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "valid_extensions entry '{}' must be alphanumeric",
                ext
            )));
        }
    }
    Ok(())
}
