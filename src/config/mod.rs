//! Configuration module for Jobtrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every required setting must be present at startup; a missing one is fatal.
//!
//! # Example
//!
//! ```no_run
//! use jobtrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("jobtrawl.toml")).unwrap();
//! println!("Workers: {}", config.pipeline.pool_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, PipelineConfig, ProxyConfig, SiteConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, API_KEY_ENV,
};
pub use validation::validate;
