//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Jobtrawl database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per ingested search title
CREATE TABLE IF NOT EXISTS search_queries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    query_url TEXT NOT NULL,
    last_page_number INTEGER,
    pagination_links TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_search_queries_last_page ON search_queries(last_page_number);

-- Listings scraped from result pages, enriched from detail pages
CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    search_query_id INTEGER NOT NULL REFERENCES search_queries(id),
    page_number INTEGER NOT NULL,
    title TEXT NOT NULL,
    company TEXT NOT NULL,
    location TEXT NOT NULL,
    posted_date TEXT NOT NULL,
    detail_url TEXT NOT NULL,
    rating TEXT,
    employment_type TEXT,
    description TEXT,
    apply_link TEXT,
    scraped_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_listings_query ON listings(search_query_id);
CREATE INDEX IF NOT EXISTS idx_listings_detail_url ON listings(detail_url);
CREATE INDEX IF NOT EXISTS idx_listings_apply_link ON listings(apply_link);

-- Result pages fetched and stored, whether or not they held listings
CREATE TABLE IF NOT EXISTS scraped_pages (
    search_query_id INTEGER NOT NULL REFERENCES search_queries(id),
    page_number INTEGER NOT NULL,
    scraped_at TEXT NOT NULL,
    PRIMARY KEY (search_query_id, page_number)
);

-- Databases written before page tracking existed
INSERT OR IGNORE INTO scraped_pages (search_query_id, page_number, scraped_at)
    SELECT search_query_id, page_number, MIN(scraped_at)
    FROM listings
    GROUP BY search_query_id, page_number;
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
