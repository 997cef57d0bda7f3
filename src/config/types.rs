use serde::Deserialize;

/// Main configuration structure for Jobtrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub site: SiteConfig,
    pub proxy: ProxyConfig,
    pub output: OutputConfig,
}

/// Worker pool, retry and scrape-policy settings
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of tasks in flight at once
    #[serde(rename = "pool-size")]
    pub pool_size: u32,

    /// Number of retries allowed after the first failed attempt
    #[serde(rename = "retry-limit")]
    pub retry_limit: u32,

    /// Hard timeout for a single proxied fetch (seconds)
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// Length of one backoff time unit (milliseconds)
    #[serde(rename = "backoff-unit-ms", default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Upper bound on a single backoff wait (seconds); unbounded when absent
    #[serde(rename = "max-backoff-secs", default)]
    pub max_backoff_secs: Option<u64>,

    /// Scrape result pages again even when they were already scraped
    #[serde(rename = "rescrape-existing", default)]
    pub rescrape_existing: bool,
}

/// Listings site settings
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Canonical base URL of the listings site (e.g. "https://uk.indeed.com")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Location used in every search query
    pub location: String,
}

/// Rendering proxy settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Proxy endpoint that renders the target page
    pub endpoint: String,

    /// API credential; falls back to the `SCRAPER_API_KEY` environment variable
    #[serde(rename = "api-key", default)]
    pub api_key: String,

    /// Optional geography hint forwarded to the proxy
    #[serde(rename = "country-code", default)]
    pub country_code: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the spillover file of probe URLs that exhausted their retries
    #[serde(rename = "spillover-path")]
    pub spillover_path: String,

    /// Directory for CSV exports
    #[serde(rename = "csv-dir", default = "default_csv_dir")]
    pub csv_dir: String,
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_csv_dir() -> String {
    "./csv_exports".to_string()
}
