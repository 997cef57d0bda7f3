//! Jobtrawl: a phased job-listing scraper
//!
//! This crate discovers job postings for a set of search terms, paginates through
//! their result sets, extracts listing records and enriches them with detail-page
//! fields. Every fetch goes through a rendering proxy and every result lands in
//! SQLite.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod ingest;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use crate::crawler::{ErrorClass, FetchError};
use thiserror::Error;

/// Main error type for Jobtrawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Proxy health check failed: {0}")]
    HealthCheck(String),

    #[error("Task '{label}' aborted: {message}")]
    TaskAborted { label: String, message: String },
}

impl TrawlError {
    /// Classifies the error for the retry loop
    ///
    /// Only fetch-level failures (timeouts, transport errors, non-2xx responses)
    /// are worth another attempt. Everything else aborts the task at once.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Fetch(_) => ErrorClass::Retryable,
            _ => ErrorClass::NonRetryable,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing required setting: {0}")]
    Missing(String),
}

/// Result type alias for Jobtrawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, Phase, PhaseReport};
pub use state::{LastPage, ListingStage};
