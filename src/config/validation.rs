use crate::config::types::{
    Config, ContentConfig, CrawlerConfig, OutputConfig, PriorityConfig, MAX_TIMEOUT_SECS,
};
use crate::ConfigError;

/// Upper bound on the worker pool size
const MAX_THREADS: usize = 512;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_content_config(&config.content)?;
    validate_priority_config(&config.priority)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if !(config.timeout_secs > 0.0 && config.timeout_secs <= MAX_TIMEOUT_SECS) {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be in (0, {}], got {}",
            MAX_TIMEOUT_SECS, config.timeout_secs
        )));
    }

    if config.threads < 1 || config.threads > MAX_THREADS {
        return Err(ConfigError::Validation(format!(
            "threads must be between 1 and {}, got {}",
            MAX_THREADS, config.threads
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.robots_cache_size < 1 {
        return Err(ConfigError::Validation(format!(
            "robots_cache_size must be >= 1, got {}",
            config.robots_cache_size
        )));
    }

    Ok(())
}

/// Validates content policy
fn validate_content_config(config: &ContentConfig) -> Result<(), ConfigError> {
    if config.html_mime_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "html_mime_prefix cannot be empty".to_string(),
        ));
    }

    if config.max_html_bytes < 1 {
        return Err(ConfigError::Validation(
            "max_html_bytes must be >= 1".to_string(),
        ));
    }

    for ext in &config.disallowed_extensions {
        validate_extension(ext)?;
    }

    Ok(())
}

/// Validates a blacklisted extension such as ".png"
fn validate_extension(ext: &str) -> Result<(), ConfigError> {
    if ext.len() < 2 || !ext.starts_with('.') {
        return Err(ConfigError::Validation(format!(
            "Extension '{}' must start with '.' and name a suffix",
            ext
        )));
    }
    Ok(())
}

/// Validates priority weights
fn validate_priority_config(config: &PriorityConfig) -> Result<(), ConfigError> {
    let weights = [
        ("novelty_weight_domain", config.novelty_weight_domain),
        ("novelty_weight_superdomain", config.novelty_weight_superdomain),
        ("novelty_scale", config.novelty_scale),
    ];

    for (name, value) in weights {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{} must be a finite, non-negative number, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.log_path.is_empty() {
        return Err(ConfigError::Validation(
            "log_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
