//! Search term ingestion
//!
//! Turns a plain-text list of job titles into search queries. Parenthesised
//! qualifiers such as pay bands are dropped before the query URL is built.

use crate::config::SiteConfig;
use crate::storage::Storage;
use crate::url::search_url;
use crate::Result;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

const PARENTHESIZED: &str = r"\s*\([^)]*\)\s*";

/// Strips parenthesised text and normalizes whitespace in a job title
///
/// # Example
///
/// ```
/// use jobtrawl::ingest::clean_title;
///
/// assert_eq!(clean_title("Staff Nurse (Band 5)"), "Staff Nurse");
/// assert_eq!(clean_title("  Data   Analyst "), "Data Analyst");
/// ```
pub fn clean_title(raw: &str) -> String {
    let stripped = match Regex::new(PARENTHESIZED) {
        Ok(re) => re.replace_all(raw, " ").into_owned(),
        Err(_) => raw.to_string(),
    };

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reads a titles file, one title per line
///
/// Titles are cleaned; blank lines and repeats are skipped, first occurrence wins.
pub fn read_titles(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_titles(&content))
}

fn parse_titles(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    content
        .lines()
        .map(clean_title)
        .filter(|title| !title.is_empty())
        .filter(|title| seen.insert(title.to_lowercase()))
        .collect()
}

/// Creates one search query per title not already stored
///
/// Returns the number of queries created.
pub fn ingest_titles(storage: &dyn Storage, site: &SiteConfig, titles: &[String]) -> Result<usize> {
    let existing: HashSet<String> = storage
        .list_search_queries()?
        .into_iter()
        .map(|query| query.title.to_lowercase())
        .collect();

    let mut created = 0;
    for title in titles {
        if existing.contains(&title.to_lowercase()) {
            tracing::debug!("Search query for '{}' already exists", title);
            continue;
        }

        let query_url = search_url(&site.base_url, title, &site.location);
        let id = storage.insert_search_query(title, &query_url)?;
        tracing::debug!("Created search query {} for '{}'", id, title);
        created += 1;
    }

    tracing::info!(
        "Ingested {} new search queries ({} titles read)",
        created,
        titles.len()
    );

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use tempfile::TempDir;

    fn site() -> SiteConfig {
        SiteConfig {
            base_url: "https://uk.indeed.com".to_string(),
            location: "London".to_string(),
        }
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("Nurse (Band 5)"), "Nurse");
        assert_eq!(clean_title("Data (Senior) Analyst"), "Data Analyst");
        assert_eq!(clean_title("Chef (Head) (Nights)"), "Chef");
        assert_eq!(clean_title("Software Engineer"), "Software Engineer");
        assert_eq!(clean_title("(Any)"), "");
    }

    #[test]
    fn test_parse_titles_skips_blanks_and_repeats() {
        let titles = parse_titles("Nurse (Band 5)\n\n  \nCook\nnurse\nCook (Nights)\nWelder\n");
        assert_eq!(titles, vec!["Nurse", "Cook", "Welder"]);
    }

    #[test]
    fn test_read_titles_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("titles.txt");
        std::fs::write(&path, "Software Engineer\r\nStaff Nurse (Band 6)\r\n").unwrap();

        let titles = read_titles(&path).unwrap();
        assert_eq!(titles, vec!["Software Engineer", "Staff Nurse"]);
    }

    #[test]
    fn test_ingest_creates_queries_once() {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new(&dir.path().join("test.db")).unwrap();
        let titles = vec!["software engineer".to_string(), "nurse".to_string()];

        assert_eq!(ingest_titles(&storage, &site(), &titles).unwrap(), 2);
        assert_eq!(ingest_titles(&storage, &site(), &titles).unwrap(), 0);

        let queries = storage.list_search_queries().unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(
            queries[0].query_url,
            "https://uk.indeed.com/jobs?q=software+engineer&l=London"
        );
        assert!(queries.iter().all(|q| !q.is_discovered()));
    }
}
