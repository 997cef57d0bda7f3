//! Output module for pipeline artifacts and reports
//!
//! This module handles:
//! - The spillover file of discovery probes that exhausted their retries
//! - CSV snapshots of search queries and listings
//! - Pipeline progress statistics

pub mod csv_export;
mod spillover;
pub mod stats;

pub use csv_export::{export_csv, CsvExport};
pub use spillover::Spillover;
pub use stats::{load_statistics, print_statistics, PipelineStatistics};
