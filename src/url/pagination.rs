/// Result offset used to land on (or past) the last results page
pub const PROBE_OFFSET: u32 = 3000;

/// Number of listings the site shows per results page
pub const RESULTS_PER_PAGE: u32 = 10;

/// Highest page count the probe can report
///
/// The probe offset lands at most on this page, so a larger indicator is
/// not something the site can actually serve.
pub const MAX_PAGES: u32 = PROBE_OFFSET / RESULTS_PER_PAGE + 1;

/// Builds the deep probe URL for last-page discovery
///
/// The site clamps an out-of-range offset to its final page, so the probe
/// lands on the last page and its pagination control names that page.
pub fn probe_url(query_url: &str) -> String {
    with_offset(query_url, PROBE_OFFSET)
}

/// Generates the per-page URLs for a query with `page_count` pages
///
/// Entry 0 is the canonical query URL itself; entry `k` carries an offset
/// of `k * RESULTS_PER_PAGE`. Counts above [`MAX_PAGES`] are clamped.
///
/// # Examples
///
/// ```
/// use jobtrawl::url::pagination_links;
///
/// let links = pagination_links("https://site/jobs?q=nurse&l=London", 3);
/// assert_eq!(links, vec![
///     "https://site/jobs?q=nurse&l=London".to_string(),
///     "https://site/jobs?q=nurse&l=London&start=10".to_string(),
///     "https://site/jobs?q=nurse&l=London&start=20".to_string(),
/// ]);
/// ```
pub fn pagination_links(query_url: &str, page_count: u32) -> Vec<String> {
    (0..page_count.min(MAX_PAGES))
        .map(|page| match page {
            0 => query_url.to_string(),
            k => with_offset(query_url, k.saturating_mul(RESULTS_PER_PAGE)),
        })
        .collect()
}

fn with_offset(query_url: &str, offset: u32) -> String {
    let separator = if query_url.contains('?') { '&' } else { '?' };
    format!("{}{}start={}", query_url, separator, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUERY: &str = "https://site/jobs?q=software+engineer&l=London";

    #[test]
    fn test_probe_url() {
        assert_eq!(
            probe_url(QUERY),
            "https://site/jobs?q=software+engineer&l=London&start=3000"
        );
    }

    #[test]
    fn test_probe_url_without_query_string() {
        assert_eq!(probe_url("https://site/jobs"), "https://site/jobs?start=3000");
    }

    #[test]
    fn test_three_pages() {
        let links = pagination_links(QUERY, 3);
        assert_eq!(
            links,
            vec![
                QUERY.to_string(),
                format!("{}&start=10", QUERY),
                format!("{}&start=20", QUERY),
            ]
        );
    }

    #[test]
    fn test_link_count_matches_page_count() {
        for count in [1, 2, 15, 100] {
            let links = pagination_links(QUERY, count);
            assert_eq!(links.len(), count as usize);
            assert_eq!(links[0], QUERY);
        }
    }

    #[test]
    fn test_zero_pages_yields_no_links() {
        assert!(pagination_links(QUERY, 0).is_empty());
    }

    #[test]
    fn test_huge_page_count_is_clamped() {
        let links = pagination_links(QUERY, u32::MAX);
        assert_eq!(links.len(), MAX_PAGES as usize);
        assert_eq!(links[300], format!("{}&start=3000", QUERY));
    }

    #[test]
    fn test_last_link_offset() {
        let links = pagination_links(QUERY, 100);
        assert_eq!(links[99], format!("{}&start=990", QUERY));
    }
}
