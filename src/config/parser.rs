use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable consulted when the config file carries no API key
pub const API_KEY_ENV: &str = "SCRAPER_API_KEY";

/// Loads and parses a configuration file from the given path
///
/// The proxy API key may be left out of the file, in which case it is read
/// from `SCRAPER_API_KEY`. The merged configuration is then validated.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use jobtrawl::config::load_config;
///
/// let config = load_config(Path::new("jobtrawl.toml")).unwrap();
/// println!("Pool size: {}", config.pipeline.pool_size);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    resolve_api_key(&mut config, std::env::var(API_KEY_ENV).ok());
    validate(&config)?;
    Ok(config)
}

/// Parses configuration text without validating it
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    Ok(toml::from_str(content)?)
}

/// Fills in the proxy API key from the environment when the file has none
fn resolve_api_key(config: &mut Config, from_env: Option<String>) {
    if config.proxy.api_key.trim().is_empty() {
        if let Some(key) = from_env {
            config.proxy.api_key = key;
        }
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs can be told apart by their settings.
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
