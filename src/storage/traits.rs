//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::extract::{ListingDetails, ListingSummary};
use crate::state::{LastPage, ListingStage};
use crate::storage::{ListingRecord, SearchQueryRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Search query not found: {0}")]
    SearchQueryNotFound(i64),

    #[error("Listing not found: {0}")]
    ListingNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Implementations must be shareable between concurrently running tasks.
/// Each method is one unit of work: it either commits fully or not at all.
pub trait Storage: Send + Sync {
    // ===== Search Queries =====

    /// Creates a search query for a title and returns its ID
    fn insert_search_query(&self, title: &str, query_url: &str) -> StorageResult<i64>;

    /// Gets a search query by ID
    fn get_search_query(&self, id: i64) -> StorageResult<SearchQueryRecord>;

    /// Gets every search query, oldest first
    fn list_search_queries(&self) -> StorageResult<Vec<SearchQueryRecord>>;

    /// Gets the search queries whose page count has not been discovered
    fn queries_pending_discovery(&self) -> StorageResult<Vec<SearchQueryRecord>>;

    /// Gets the search queries that have pagination links
    ///
    /// With `include_scraped` false, only queries with at least one page not
    /// yet marked scraped are returned.
    fn queries_with_pagination(&self, include_scraped: bool)
        -> StorageResult<Vec<SearchQueryRecord>>;

    /// Records the discovered page count of a query
    ///
    /// Pagination links are generated from the stored query URL in the same
    /// transaction; a query with no results keeps NULL links.
    fn record_last_page(&self, id: i64, last_page: LastPage) -> StorageResult<()>;

    // ===== Listings =====

    /// Inserts the listings found on one results page of a query
    ///
    /// The page is marked scraped in the same transaction, even when
    /// `listings` is empty. Returns the number of rows inserted.
    fn insert_listings(
        &self,
        search_query_id: i64,
        page_number: u32,
        listings: &[ListingSummary],
    ) -> StorageResult<usize>;

    /// Gets the page numbers of a query already marked scraped, ascending
    fn scraped_pages(&self, search_query_id: i64) -> StorageResult<Vec<u32>>;

    /// Gets a listing by ID
    fn get_listing(&self, id: i64) -> StorageResult<ListingRecord>;

    /// Gets every listing, oldest first
    fn list_listings(&self) -> StorageResult<Vec<ListingRecord>>;

    /// Gets listings still missing detail fields that have a usable detail URL
    fn listings_pending_details(&self) -> StorageResult<Vec<ListingRecord>>;

    /// Writes detail fields onto a listing
    ///
    /// An empty value never replaces a populated column.
    fn update_listing_details(&self, id: i64, details: &ListingDetails) -> StorageResult<()>;

    // ===== Statistics =====

    /// Counts listings in a given stage
    fn count_listings_by_stage(&self, stage: ListingStage) -> StorageResult<u64>;
}
