//! Search-result page extraction
//!
//! Result pages either carry the site's "no results" banner, which is the
//! expected answer for a query with zero pages, or a list of listing cards.

use super::{or_placeholder, select_attr, select_text, NOT_AVAILABLE};
use crate::url::resolve_detail_link;
use scraper::{Html, Selector};

const NO_RESULTS_SELECTOR: &str = ".jobsearch-NoResult-messageContainer";
const LISTING_CARD_SELECTOR: &str = "li.css-1ac2h1w";
const TITLE_SELECTOR: &str = "a.jcs-JobTitle";
const COMPANY_SELECTOR: &str = r#"span[data-testid="company-name"]"#;
const LOCATION_SELECTOR: &str = r#"div[data-testid="text-location"]"#;
const POSTED_DATE_SELECTOR: &str = r#"span[data-testid="myJobsStateDate"]"#;
const CURRENT_PAGE_SELECTOR: &str = r#"a[data-testid="pagination-page-current"]"#;

/// Core fields of one listing card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSummary {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Free-form posting age text, e.g. "3 days ago"
    pub posted_date: String,
    /// Absolute detail page URL, or the placeholder if the card had no usable link
    pub detail_url: String,
}

impl ListingSummary {
    /// Returns true if the card carried a usable detail link
    pub fn has_detail_url(&self) -> bool {
        self.detail_url != NOT_AVAILABLE
    }
}

/// Outcome of extracting a result page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageExtraction {
    /// The page carries the "no results" banner
    NoResults,

    /// Listing cards found on the page (possibly none)
    Listings(Vec<ListingSummary>),
}

impl PageExtraction {
    pub fn is_no_results(&self) -> bool {
        matches!(self, Self::NoResults)
    }

    /// Consumes the extraction, yielding its listings (none for the sentinel)
    pub fn into_listings(self) -> Vec<ListingSummary> {
        match self {
            Self::NoResults => Vec::new(),
            Self::Listings(listings) => listings,
        }
    }
}

/// Extracts listing summaries from a search-result page
///
/// The "no results" banner short-circuits extraction. A page with neither the
/// banner nor any cards yields an empty `Listings`, which is not an error.
///
/// # Arguments
///
/// * `markup` - Rendered page markup
/// * `base_url` - Site base URL used to resolve relative detail links
///
/// # Example
///
/// ```
/// use jobtrawl::extract::{extract_listings, PageExtraction};
///
/// let html = r#"<div class="jobsearch-NoResult-messageContainer">Nothing</div>"#;
/// assert_eq!(extract_listings(html, "https://site"), PageExtraction::NoResults);
/// ```
pub fn extract_listings(markup: &str, base_url: &str) -> PageExtraction {
    let document = Html::parse_document(markup);

    if has_no_results_banner(&document) {
        return PageExtraction::NoResults;
    }

    let Ok(card_selector) = Selector::parse(LISTING_CARD_SELECTOR) else {
        return PageExtraction::Listings(Vec::new());
    };

    let listings = document
        .select(&card_selector)
        .map(|card| {
            let posted_date = select_text(card, POSTED_DATE_SELECTOR)
                .map(|text| strip_posted_label(&text))
                .filter(|text| !text.is_empty());

            let detail_url = select_attr(card, TITLE_SELECTOR, "href")
                .and_then(|href| resolve_detail_link(base_url, &href));

            ListingSummary {
                title: or_placeholder(select_text(card, TITLE_SELECTOR)),
                company: or_placeholder(select_text(card, COMPANY_SELECTOR)),
                location: or_placeholder(select_text(card, LOCATION_SELECTOR)),
                posted_date: or_placeholder(posted_date),
                detail_url: or_placeholder(detail_url),
            }
        })
        .collect();

    PageExtraction::Listings(listings)
}

/// Returns true if the markup carries the "no results" banner
pub fn is_no_results(markup: &str) -> bool {
    has_no_results_banner(&Html::parse_document(markup))
}

/// Reads the page number shown as current in the pagination control
///
/// Returns None when the control is missing or its text is not a positive number.
pub fn current_page_indicator(markup: &str) -> Option<u32> {
    let document = Html::parse_document(markup);
    let text = select_text(document.root_element(), CURRENT_PAGE_SELECTOR)?;

    if !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    text.parse::<u32>().ok().filter(|page| *page >= 1)
}

fn has_no_results_banner(document: &Html) -> bool {
    Selector::parse(NO_RESULTS_SELECTOR)
        .map(|selector| document.select(&selector).next().is_some())
        .unwrap_or(false)
}

/// Drops every "Posted" label from the posting age
///
/// Cards may carry the label twice: once in a hidden span and once in the
/// visible text.
fn strip_posted_label(text: &str) -> String {
    text.replace("Posted", "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
