use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_seeds(&config.seeds)?;

    if config.run_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "run_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
///
/// Also called when a crawler is built directly from a `CrawlerConfig`, so that
/// a run never starts with an admission gate of capacity zero.
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_concurrent_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_workers must be >= 1, got {}",
            config.max_concurrent_workers
        )));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be >= 1".to_string(),
        ));
    }

    // An empty pattern would classify every URL as a product
    if let Some(index) = config
        .product_url_patterns
        .iter()
        .position(|pattern| pattern.is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "product_url_patterns[{}] cannot be empty",
            index
        )));
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
    if config.result_path.is_empty() {
        return Err(ConfigError::Validation(
            "result_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates seed URLs: each must be an absolute HTTP(S) URL
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use the HTTP or HTTPS scheme",
                seed
            )));
        }
    }

    Ok(())
}
