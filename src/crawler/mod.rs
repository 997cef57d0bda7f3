//! Crawler module: fetching and phase orchestration
//!
//! This module contains the core scraping pipeline, including:
//! - Proxy fetching with per-call timeouts
//! - Exponential backoff for transient fetch failures
//! - A bounded task pool that isolates per-task failures
//! - Last-page discovery for search queries
//! - The three-phase coordinator

mod backoff;
mod coordinator;
mod discovery;
mod executor;
mod fetcher;

pub use backoff::{retry_with_backoff, BackoffPolicy, ErrorClass, RetryDecision};
pub use coordinator::{Coordinator, Phase, PhaseReport};
pub use discovery::{discover_last_page, last_page_from_markup};
pub use executor::{TaskExecutor, TaskOutcome};
pub use fetcher::{build_http_client, FetchError, ProxyClient};
