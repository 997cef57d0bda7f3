//! Last-page discovery
//!
//! A search query's page count is found by requesting a result page far past
//! any realistic end of the result set. The site then either shows its "no
//! results" banner, or clamps to the last real page and marks it as current
//! in the pagination control.

use crate::crawler::backoff::{retry_with_backoff, BackoffPolicy};
use crate::crawler::fetcher::ProxyClient;
use crate::extract::{current_page_indicator, is_no_results};
use crate::state::LastPage;
use crate::url::{probe_url, MAX_PAGES};
use crate::{Result, TrawlError};

/// Discovers how many result pages `query_url` has
///
/// The probe is retried per `policy`. Once retries are exhausted the last
/// fetch error is returned; the caller decides what to do with the probe URL.
pub async fn discover_last_page(
    client: &ProxyClient,
    policy: &BackoffPolicy,
    query_url: &str,
) -> Result<LastPage> {
    let probe = probe_url(query_url);
    let target = probe.as_str();

    let markup = retry_with_backoff(policy, target, move || async move {
        client.fetch(target).await.map_err(TrawlError::from)
    })
    .await?;

    Ok(last_page_from_markup(&markup))
}

/// Reads the page count off a probe response
///
/// A page with no pagination control counts as exactly one page. Counts are
/// clamped to [`MAX_PAGES`].
pub fn last_page_from_markup(markup: &str) -> LastPage {
    if is_no_results(markup) {
        return LastPage::NoResults;
    }

    let pages = current_page_indicator(markup).unwrap_or(1);
    LastPage::Pages(pages.min(MAX_PAGES))
}
