use url::form_urlencoded;

/// Builds the canonical search URL for a job title
///
/// Spaces become `+` and any other reserved characters are percent-encoded,
/// for both the title and the location.
///
/// # Arguments
///
/// * `base_url` - The site's base URL (a trailing slash is ignored)
/// * `title` - The search title
/// * `location` - The search location
///
/// # Examples
///
/// ```
/// use jobtrawl::url::search_url;
///
/// let url = search_url("https://uk.indeed.com", "software engineer", "London");
/// assert_eq!(url, "https://uk.indeed.com/jobs?q=software+engineer&l=London");
/// ```
pub fn search_url(base_url: &str, title: &str, location: &str) -> String {
    format!(
        "{}/jobs?q={}&l={}",
        base_url.trim_end_matches('/'),
        encode(title.trim()),
        encode(location.trim())
    )
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
