//! CSV snapshot export
//!
//! Writes one file per entity, each with a header row. Optional detail fields
//! that have not been scraped yet are written as empty cells.

use crate::state::LastPage;
use crate::storage::{ListingRecord, SearchQueryRecord, Storage};
use crate::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const SEARCH_QUERIES_FILE: &str = "search_queries.csv";
pub const LISTINGS_FILE: &str = "listings.csv";

const SEARCH_QUERY_HEADER: [&str; 6] = [
    "id",
    "title",
    "query_url",
    "last_page_number",
    "pagination_links",
    "created_at",
];

const LISTING_HEADER: [&str; 13] = [
    "id",
    "search_query_id",
    "page_number",
    "title",
    "company",
    "location",
    "posted_date",
    "detail_url",
    "rating",
    "employment_type",
    "description",
    "apply_link",
    "scraped_at",
];

/// Files written by an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub search_queries_path: PathBuf,
    pub listings_path: PathBuf,
    pub search_queries: usize,
    pub listings: usize,
}

/// Exports both entities into `dir`, creating it if needed
///
/// With `skip_empty`, queries that returned no results are left out, along
/// with any listings they own.
pub fn export_csv(storage: &dyn Storage, dir: &Path, skip_empty: bool) -> Result<CsvExport> {
    std::fs::create_dir_all(dir)?;

    let queries: Vec<SearchQueryRecord> = storage
        .list_search_queries()?
        .into_iter()
        .filter(|q| !(skip_empty && q.last_page == Some(LastPage::NoResults)))
        .collect();
    let kept: HashSet<i64> = queries.iter().map(|q| q.id).collect();

    let listings: Vec<ListingRecord> = storage
        .list_listings()?
        .into_iter()
        .filter(|l| kept.contains(&l.search_query_id))
        .collect();

    let search_queries_path = dir.join(SEARCH_QUERIES_FILE);
    write_search_queries(&search_queries_path, &queries)?;

    let listings_path = dir.join(LISTINGS_FILE);
    write_listings(&listings_path, &listings)?;

    tracing::info!(
        "Exported {} search queries and {} listings to {}",
        queries.len(),
        listings.len(),
        dir.display()
    );

    Ok(CsvExport {
        search_queries_path,
        listings_path,
        search_queries: queries.len(),
        listings: listings.len(),
    })
}

fn write_search_queries(path: &Path, queries: &[SearchQueryRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SEARCH_QUERY_HEADER)?;

    for query in queries {
        let last_page = query
            .last_page
            .map(|page| page.count().to_string())
            .unwrap_or_default();
        let links = match &query.pagination_links {
            Some(links) => serde_json::to_string(links).unwrap_or_default(),
            None => String::new(),
        };

        writer.write_record([
            query.id.to_string().as_str(),
            &query.title,
            &query.query_url,
            &last_page,
            &links,
            &query.created_at,
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_listings(path: &Path, listings: &[ListingRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(LISTING_HEADER)?;

    for listing in listings {
        writer.write_record([
            listing.id.to_string().as_str(),
            &listing.search_query_id.to_string(),
            &listing.page_number.to_string(),
            &listing.title,
            &listing.company,
            &listing.location,
            &listing.posted_date,
            &listing.detail_url,
            listing.rating.as_deref().unwrap_or_default(),
            listing.employment_type.as_deref().unwrap_or_default(),
            listing.description.as_deref().unwrap_or_default(),
            listing.apply_link.as_deref().unwrap_or_default(),
            &listing.scraped_at,
        ])?;
    }

    writer.flush()?;
    Ok(())
}
