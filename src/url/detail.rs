use url::Url;

/// Resolves a listing's detail href into an absolute URL
///
/// Relative hrefs are joined onto the site base URL. Returns None for empty
/// or fragment-only hrefs, for `javascript:` links, and for anything that
/// does not resolve to an http(s) URL.
///
/// # Examples
///
/// ```
/// use jobtrawl::url::resolve_detail_link;
///
/// assert_eq!(
///     resolve_detail_link("https://uk.indeed.com", "/rc/clk?jk=abc123"),
///     Some("https://uk.indeed.com/rc/clk?jk=abc123".to_string())
/// );
/// ```
pub fn resolve_detail_link(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    let base = Url::parse(base_url).ok()?;
    let resolved = base.join(href).ok()?;

    if resolved.scheme() == "http" || resolved.scheme() == "https" {
        Some(resolved.to_string())
    } else {
        None
    }
}
