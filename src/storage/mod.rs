//! Storage module for persisting pipeline data
//!
//! This module is the persistence gateway for the two entities the pipeline
//! works on:
//! - search queries, one per ingested title, with their discovered pagination
//! - listings, created from result pages and enriched from detail pages
//!
//! Every gateway call runs in its own transaction on its own connection, so
//! concurrent tasks never share a session.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::{LastPage, ListingStage};
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a search query in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQueryRecord {
    pub id: i64,
    pub title: String,
    pub query_url: String,
    /// None until last-page discovery has succeeded
    pub last_page: Option<LastPage>,
    /// Per-page URLs; present only when `last_page` has at least one page
    pub pagination_links: Option<Vec<String>>,
    pub created_at: String,
}

impl SearchQueryRecord {
    /// Returns true once last-page discovery has completed for this query
    pub fn is_discovered(&self) -> bool {
        self.last_page.is_some()
    }
}

/// Represents a listing in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub id: i64,
    pub search_query_id: i64,
    /// 1-based results page the listing was found on
    pub page_number: u32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub posted_date: String,
    pub detail_url: String,
    pub rating: Option<String>,
    pub employment_type: Option<String>,
    pub description: Option<String>,
    pub apply_link: Option<String>,
    pub scraped_at: String,
}

impl ListingRecord {
    pub fn stage(&self) -> ListingStage {
        ListingStage::from_apply_link(self.apply_link.as_deref())
    }
}
