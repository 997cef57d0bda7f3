//! Statistics generation from the pipeline database
//!
//! This module provides functionality for extracting and displaying
//! pipeline progress from the storage layer.

use crate::state::{LastPage, ListingStage};
use crate::storage::Storage;
use crate::Result;

/// Pipeline progress summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStatistics {
    /// Total number of search queries
    pub total_queries: u64,

    /// Queries whose page count is still unknown
    pub queries_pending_discovery: u64,

    /// Queries the site reported no results for
    pub queries_without_results: u64,

    /// Queries with at least one result page
    pub queries_with_pages: u64,

    /// Sum of result pages over all discovered queries
    pub total_result_pages: u64,

    /// Listings holding only their core fields
    pub summary_listings: u64,

    /// Listings with detail fields filled in
    pub enriched_listings: u64,
}

impl PipelineStatistics {
    pub fn total_listings(&self) -> u64 {
        self.summary_listings + self.enriched_listings
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<PipelineStatistics> {
    let mut stats = PipelineStatistics::default();

    for query in storage.list_search_queries()? {
        stats.total_queries += 1;
        match query.last_page {
            None => stats.queries_pending_discovery += 1,
            Some(LastPage::NoResults) => stats.queries_without_results += 1,
            Some(LastPage::Pages(n)) => {
                stats.queries_with_pages += 1;
                stats.total_result_pages += u64::from(n);
            }
        }
    }

    stats.summary_listings = storage.count_listings_by_stage(ListingStage::Summary)?;
    stats.enriched_listings = storage.count_listings_by_stage(ListingStage::Enriched)?;

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &PipelineStatistics) {
    println!("=== Pipeline Statistics ===\n");

    println!("Search Queries:");
    println!("  Total: {}", stats.total_queries);
    println!("  Awaiting discovery: {}", stats.queries_pending_discovery);
    println!("  No results: {}", stats.queries_without_results);
    println!(
        "  With results: {} ({} result pages)",
        stats.queries_with_pages, stats.total_result_pages
    );
    println!();

    println!("Listings:");
    println!("  Total: {}", stats.total_listings());
    println!("  Summary only: {}", stats.summary_listings);
    println!("  Enriched: {}", stats.enriched_listings);
    println!();

    let enriched_rate = if stats.total_listings() > 0 {
        (stats.enriched_listings as f64 / stats.total_listings() as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Enrichment: {:.1}% ({} / {} listings)",
        enriched_rate,
        stats.enriched_listings,
        stats.total_listings()
    );
}
