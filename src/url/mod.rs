//! URL handling module for Jobtrawl
//!
//! This module builds every URL the pipeline requests: the canonical search URL
//! for a title, the deep probe URL used for last-page discovery, the per-page
//! pagination links, and absolute detail links for listings.

mod detail;
mod pagination;
mod search;

// Re-export main functions
pub use detail::resolve_detail_link;
pub use pagination::{pagination_links, probe_url, MAX_PAGES, PROBE_OFFSET, RESULTS_PER_PAGE};
pub use search::search_url;
