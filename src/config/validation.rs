use crate::config::types::{Config, OutputConfig, PipelineConfig, ProxyConfig, SiteConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_pipeline_config(&config.pipeline)?;
    validate_site_config(&config.site)?;
    validate_proxy_config(&config.proxy)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates pool, retry and timeout settings
fn validate_pipeline_config(config: &PipelineConfig) -> ConfigResult<()> {
    if config.pool_size < 1 || config.pool_size > 200 {
        return Err(ConfigError::Validation(format!(
            "pool_size must be between 1 and 200, got {}",
            config.pool_size
        )));
    }

    // Waits grow as 2^attempt, so keep the ceiling small
    if config.retry_limit > 10 {
        return Err(ConfigError::Validation(format!(
            "retry_limit must be <= 10, got {}",
            config.retry_limit
        )));
    }

    if config.fetch_timeout_secs < 1 || config.fetch_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be between 1 and 300, got {}",
            config.fetch_timeout_secs
        )));
    }

    if config.backoff_unit_ms < 1 {
        return Err(ConfigError::Validation(
            "backoff_unit_ms must be >= 1".to_string(),
        ));
    }

    if config.max_backoff_secs == Some(0) {
        return Err(ConfigError::Validation(
            "max_backoff_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates listings site settings
fn validate_site_config(config: &SiteConfig) -> ConfigResult<()> {
    validate_http_url("base_url", &config.base_url)?;

    if config.location.trim().is_empty() {
        return Err(ConfigError::Missing("site.location".to_string()));
    }

    Ok(())
}

/// Validates proxy endpoint and credentials
fn validate_proxy_config(config: &ProxyConfig) -> ConfigResult<()> {
    validate_http_url("endpoint", &config.endpoint)?;

    if config.api_key.trim().is_empty() {
        return Err(ConfigError::Missing(
            "proxy.api-key (or SCRAPER_API_KEY)".to_string(),
        ));
    }

    if let Some(code) = &config.country_code {
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Validation(format!(
                "country_code must be a two-letter code, got '{}'",
                code
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Missing("output.database-path".to_string()));
    }

    if config.spillover_path.is_empty() {
        return Err(ConfigError::Missing("output.spillover-path".to_string()));
    }

    if config.csv_dir.is_empty() {
        return Err(ConfigError::Validation(
            "csv_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a setting holds an absolute http(s) URL
fn validate_http_url(name: &str, value: &str) -> ConfigResult<()> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    Ok(())
}
