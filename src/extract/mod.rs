//! Markup extraction for search-result and detail pages
//!
//! This module turns rendered page markup into structured records:
//! - `listings`: result pages into listing summaries, the "no results" sentinel,
//!   and the pagination control's page indicator
//! - `details`: a single listing's detail page into its supplemental fields
//!
//! A missing field is never an error. It resolves to the `NOT_AVAILABLE`
//! placeholder and the rest of the record is still extracted.

mod details;
mod listings;

pub use details::{extract_details, ListingDetails};
pub use listings::{
    current_page_indicator, extract_listings, is_no_results, ListingSummary, PageExtraction,
};

use scraper::{ElementRef, Selector};

/// Placeholder stored for any field the markup does not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// Returns the whitespace-collapsed text of the first match of `css` under `element`
///
/// Empty text counts as absent.
fn select_text(element: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    element
        .select(&selector)
        .next()
        .map(collapse_text)
        .filter(|text| !text.is_empty())
}

/// Returns an attribute of the first match of `css` under `element`
fn select_attr(element: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    element
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Joins an element's text nodes, collapsing runs of whitespace to one space
fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unwraps an optional field into its value or the placeholder
fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
