//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.
//! The database runs in WAL mode and every call opens its own connection, so
//! tasks on different threads write concurrently and rely on SQLite's locking.

use crate::extract::{ListingDetails, ListingSummary};
use crate::state::{LastPage, ListingStage};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{ListingRecord, SearchQueryRecord};
use crate::url::pagination_links;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

const QUERY_COLUMNS: &str =
    "id, title, query_url, last_page_number, pagination_links, created_at";

const LISTING_COLUMNS: &str = "id, search_query_id, page_number, title, company, location, \
     posted_date, detail_url, rating, employment_type, description, apply_link, scraped_at";

/// SQLite storage backend
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    path: PathBuf,
}

impl SqliteStorage {
    /// Opens (creating if needed) the database at `path` and initializes its schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a fresh connection for one unit of work
    fn connect(&self) -> StorageResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    fn select_queries(&self, filter: &str) -> StorageResult<Vec<SearchQueryRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM search_queries {} ORDER BY id",
            QUERY_COLUMNS, filter
        ))?;
        let rows = stmt.query_map([], query_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn select_listings(&self, filter: &str) -> StorageResult<Vec<ListingRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM listings {} ORDER BY id",
            LISTING_COLUMNS, filter
        ))?;
        let rows = stmt.query_map([], listing_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl Storage for SqliteStorage {
    // ===== Search Queries =====

    fn insert_search_query(&self, title: &str, query_url: &str) -> StorageResult<i64> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO search_queries (title, query_url, created_at) VALUES (?1, ?2, ?3)",
            params![title, query_url, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_search_query(&self, id: i64) -> StorageResult<SearchQueryRecord> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("SELECT {} FROM search_queries WHERE id = ?1", QUERY_COLUMNS),
            params![id],
            query_from_row,
        )
        .optional()?
        .ok_or(StorageError::SearchQueryNotFound(id))
    }

    fn list_search_queries(&self) -> StorageResult<Vec<SearchQueryRecord>> {
        self.select_queries("")
    }

    fn queries_pending_discovery(&self) -> StorageResult<Vec<SearchQueryRecord>> {
        self.select_queries("WHERE last_page_number IS NULL")
    }

    fn queries_with_pagination(
        &self,
        include_scraped: bool,
    ) -> StorageResult<Vec<SearchQueryRecord>> {
        if include_scraped {
            self.select_queries("WHERE pagination_links IS NOT NULL")
        } else {
            self.select_queries(
                "WHERE pagination_links IS NOT NULL
                 AND (SELECT COUNT(*) FROM scraped_pages p
                      WHERE p.search_query_id = search_queries.id) < last_page_number",
            )
        }
    }

    fn record_last_page(&self, id: i64, last_page: LastPage) -> StorageResult<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let query_url: String = tx
            .query_row(
                "SELECT query_url FROM search_queries WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StorageError::SearchQueryNotFound(id))?;

        let links = if last_page.has_pages() {
            let links = pagination_links(&query_url, last_page.count());
            Some(serde_json::to_string(&links).map_err(|e| StorageError::Serialization(e.to_string()))?)
        } else {
            None
        };

        tx.execute(
            "UPDATE search_queries SET last_page_number = ?1, pagination_links = ?2 WHERE id = ?3",
            params![last_page.to_db_value(), links, id],
        )?;

        tx.commit()?;
        Ok(())
    }

    // ===== Listings =====

    fn insert_listings(
        &self,
        search_query_id: i64,
        page_number: u32,
        listings: &[ListingSummary],
    ) -> StorageResult<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = Utc::now().to_rfc3339();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO listings (search_query_id, page_number, title, company, location,
                 posted_date, detail_url, scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for listing in listings {
                stmt.execute(params![
                    search_query_id,
                    page_number,
                    listing.title,
                    listing.company,
                    listing.location,
                    listing.posted_date,
                    listing.detail_url,
                    now
                ])?;
            }
        }

        tx.execute(
            "INSERT INTO scraped_pages (search_query_id, page_number, scraped_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (search_query_id, page_number) DO UPDATE SET scraped_at = excluded.scraped_at",
            params![search_query_id, page_number, now],
        )?;

        tx.commit()?;
        Ok(listings.len())
    }

    fn scraped_pages(&self, search_query_id: i64) -> StorageResult<Vec<u32>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT page_number FROM scraped_pages WHERE search_query_id = ?1 ORDER BY page_number",
        )?;
        let rows = stmt.query_map(params![search_query_id], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<u32>, _>>()?)
    }

    fn get_listing(&self, id: i64) -> StorageResult<ListingRecord> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("SELECT {} FROM listings WHERE id = ?1", LISTING_COLUMNS),
            params![id],
            listing_from_row,
        )
        .optional()?
        .ok_or(StorageError::ListingNotFound(id))
    }

    fn list_listings(&self) -> StorageResult<Vec<ListingRecord>> {
        self.select_listings("")
    }

    fn listings_pending_details(&self) -> StorageResult<Vec<ListingRecord>> {
        self.select_listings("WHERE apply_link IS NULL AND detail_url != 'N/A'")
    }

    fn update_listing_details(&self, id: i64, details: &ListingDetails) -> StorageResult<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let updated = tx.execute(
            "UPDATE listings SET
                rating = COALESCE(NULLIF(?1, ''), rating),
                employment_type = COALESCE(NULLIF(?2, ''), employment_type),
                description = COALESCE(NULLIF(?3, ''), description),
                apply_link = COALESCE(NULLIF(?4, ''), apply_link)
             WHERE id = ?5",
            params![
                details.rating,
                details.employment_type,
                details.description,
                details.apply_link,
                id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::ListingNotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    // ===== Statistics =====

    fn count_listings_by_stage(&self, stage: ListingStage) -> StorageResult<u64> {
        let conn = self.connect()?;
        let sql = match stage {
            ListingStage::Summary => "SELECT COUNT(*) FROM listings WHERE apply_link IS NULL",
            ListingStage::Enriched => "SELECT COUNT(*) FROM listings WHERE apply_link IS NOT NULL",
        };
        let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn query_from_row(row: &Row<'_>) -> rusqlite::Result<SearchQueryRecord> {
    let links: Option<String> = row.get(4)?;
    let pagination_links = links
        .map(|json| serde_json::from_str::<Vec<String>>(&json))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(SearchQueryRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        query_url: row.get(2)?,
        last_page: LastPage::from_db_value(row.get(3)?),
        pagination_links,
        created_at: row.get(5)?,
    })
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<ListingRecord> {
    Ok(ListingRecord {
        id: row.get(0)?,
        search_query_id: row.get(1)?,
        page_number: row.get(2)?,
        title: row.get(3)?,
        company: row.get(4)?,
        location: row.get(5)?,
        posted_date: row.get(6)?,
        detail_url: row.get(7)?,
        rating: row.get(8)?,
        employment_type: row.get(9)?,
        description: row.get(10)?,
        apply_link: row.get(11)?,
        scraped_at: row.get(12)?,
    })
}
