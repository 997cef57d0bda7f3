//! Proxy fetch client
//!
//! Every page the pipeline reads is requested through the rendering proxy, never
//! directly. The proxy takes the API key and the target URL as query parameters
//! and answers with the rendered markup.
//!
//! Errors are classified into:
//! - `Timeout` when the per-call timeout fires
//! - `Transport` for connection-level failures and unreadable bodies
//! - `Status` for non-2xx proxy responses

use crate::config::ProxyConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Connection establishment never waits longer than this, whatever the fetch timeout
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A failed fetch through the proxy
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request for {url} timed out")]
    Timeout { url: String },

    #[error("Transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Proxy returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// The target URL the failed fetch was for
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url } | Self::Transport { url, .. } | Self::Status { url, .. } => url,
        }
    }

    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Builds the HTTP client used to talk to the proxy
///
/// # Arguments
///
/// * `timeout` - Hard limit for one request, connection included
///
/// # Example
///
/// ```
/// use jobtrawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the rendering proxy
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    endpoint: String,
    api_key: String,
    country_code: Option<String>,
}

impl ProxyClient {
    /// Creates a proxy client from its configuration and the per-fetch timeout
    pub fn new(config: &ProxyConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(timeout)?,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            country_code: config.country_code.clone(),
        })
    }

    /// Fetches the rendered markup of `url` through the proxy
    ///
    /// One attempt only; retries belong to the caller's backoff policy.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut params = vec![("api_key", self.api_key.as_str()), ("url", url)];
        if let Some(country_code) = &self.country_code {
            params.push(("country_code", country_code.as_str()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }

    /// Checks that the proxy answers by fetching `base_url` through it once
    pub async fn health_check(&self, base_url: &str) -> Result<(), FetchError> {
        tracing::debug!("Probing proxy {} with {}", self.endpoint, base_url);
        self.fetch(base_url).await.map(|_| ())
    }
}
