use crate::config::types::{Config, KeywordsConfig, PathsConfig, ScrapingConfig};
use crate::job::Limit;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraping_config(&config.scraping)?;
    validate_keywords_config(&config.keywords)?;
    validate_paths_config(&config.paths)?;
    config.sources()?;
    Ok(())
}

fn validate_scraping_config(config: &ScrapingConfig) -> Result<(), ConfigError> {
    if config.sites.is_empty() {
        return Err(ConfigError::Validation(
            "sites must list at least one source".to_string(),
        ));
    }

    Limit::from_config(config.max_jobs_per_site)?;

    if !config.request_delay_secs.is_finite() || config.request_delay_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "request_delay_secs must be a non-negative number, got {}",
            config.request_delay_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.render_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "render_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_pages_per_keyword == 0 {
        return Err(ConfigError::Validation(
            "max_pages_per_keyword must be >= 1".to_string(),
        ));
    }

    if config.max_concurrent_sources < 1 || config.max_concurrent_sources > 16 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_sources must be between 1 and 16, got {}",
            config.max_concurrent_sources
        )));
    }

    if let Some(endpoint) = &config.webdriver_url {
        Url::parse(endpoint)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver_url: {}", e)))?;
    }

    Ok(())
}

fn validate_keywords_config(config: &KeywordsConfig) -> Result<(), ConfigError> {
    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "keywords must contain at least one entry".to_string(),
        ));
    }

    if let Some(blank) = config.keywords.iter().position(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "keyword #{} is blank",
            blank + 1
        )));
    }

    if config.location.trim().is_empty() {
        return Err(ConfigError::Validation(
            "location cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_paths_config(config: &PathsConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
