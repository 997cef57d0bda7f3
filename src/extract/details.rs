//! Listing detail page extraction

use super::{collapse_text, or_placeholder, select_attr, select_text};
use scraper::{Html, Selector};

const RATING_SELECTOR: &str = "div.css-1unnuiz span";
const EMPLOYMENT_TYPE_SELECTOR: &str =
    "div.js-match-insights-provider-g6kqeb .js-match-insights-provider-tvvxwd";
const DESCRIPTION_SELECTOR: &str = "#jobDescriptionText";
const APPLY_LINK_SELECTOR: &str = r#"button[contenthtml="Apply now"]"#;
const APPLY_FALLBACK_SELECTOR: &str = "button#indeedApplyButton > span";

/// Supplemental fields read from a listing's detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDetails {
    pub rating: String,
    pub employment_type: String,
    pub description: String,
    /// Apply URL, or the apply button's label when the site hides the URL
    pub apply_link: String,
}

/// Extracts the detail fields of a single listing
///
/// Each field falls back to the placeholder on its own. The apply link comes
/// from the "Apply now" button's href; when that is absent the on-site apply
/// button's label is used instead.
///
/// # Example
///
/// ```
/// use jobtrawl::extract::{extract_details, NOT_AVAILABLE};
///
/// let details = extract_details(r#"<div id="jobDescriptionText">Build things.</div>"#);
/// assert_eq!(details.description, "Build things.");
/// assert_eq!(details.rating, NOT_AVAILABLE);
/// ```
pub fn extract_details(markup: &str) -> ListingDetails {
    let document = Html::parse_document(markup);
    let root = document.root_element();

    let apply_link = select_attr(root, APPLY_LINK_SELECTOR, "href")
        .or_else(|| select_text(root, APPLY_FALLBACK_SELECTOR));

    ListingDetails {
        rating: or_placeholder(select_text(root, RATING_SELECTOR)),
        employment_type: or_placeholder(select_text(root, EMPLOYMENT_TYPE_SELECTOR)),
        description: or_placeholder(description_text(&document)),
        apply_link: or_placeholder(apply_link),
    }
}

/// Description text with one line per block of text
fn description_text(document: &Html) -> Option<String> {
    let selector = Selector::parse(DESCRIPTION_SELECTOR).ok()?;
    let element = document.select(&selector).next()?;

    let lines: Vec<String> = element
        .children()
        .filter_map(|child| match scraper::ElementRef::wrap(child) {
            Some(el) => Some(collapse_text(el)),
            None => child
                .value()
                .as_text()
                .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" ")),
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::NOT_AVAILABLE;

    const FULL_PAGE: &str = r#"
        <html><body>
          <div class="css-1unnuiz"><span>4.2</span></div>
          <div class="js-match-insights-provider-g6kqeb">
            <div class="js-match-insights-provider-tvvxwd">Full-time</div>
          </div>
          <div id="jobDescriptionText">
            <p>We are hiring.</p>
            <ul><li>Rust</li><li>SQL</li></ul>
            Apply today.
          </div>
          <button contenthtml="Apply now" href="https://careers.example.com/apply/42">Apply now</button>
        </body></html>"#;

    #[test]
    fn test_extract_all_fields() {
        let details = extract_details(FULL_PAGE);

        assert_eq!(details.rating, "4.2");
        assert_eq!(details.employment_type, "Full-time");
        assert_eq!(details.description, "We are hiring.\nRust SQL\nApply today.");
        assert_eq!(details.apply_link, "https://careers.example.com/apply/42");
    }

    #[test]
    fn test_missing_rating_is_placeholder() {
        let html = FULL_PAGE.replace(r#"<div class="css-1unnuiz"><span>4.2</span></div>"#, "");
        let details = extract_details(&html);

        assert_eq!(details.rating, NOT_AVAILABLE);
        assert_eq!(details.employment_type, "Full-time");
    }

    #[test]
    fn test_apply_fallback_label() {
        let html = r#"<html><body>
            <button id="indeedApplyButton"><span>Apply now</span></button>
        </body></html>"#;

        assert_eq!(extract_details(html).apply_link, "Apply now");
    }

    #[test]
    fn test_apply_button_without_href_uses_fallback() {
        let html = r#"<html><body>
            <button contenthtml="Apply now">Apply now</button>
            <button id="indeedApplyButton"><span>Apply with Indeed</span></button>
        </body></html>"#;

        assert_eq!(extract_details(html).apply_link, "Apply with Indeed");
    }

    #[test]
    fn test_empty_page_is_all_placeholders() {
        let details = extract_details("<html><body></body></html>");

        assert_eq!(
            details,
            ListingDetails {
                rating: NOT_AVAILABLE.to_string(),
                employment_type: NOT_AVAILABLE.to_string(),
                description: NOT_AVAILABLE.to_string(),
                apply_link: NOT_AVAILABLE.to_string(),
            }
        );
    }

    #[test]
    fn test_blank_description_is_placeholder() {
        let details = extract_details(r#"<div id="jobDescriptionText">   </div>"#);
        assert_eq!(details.description, NOT_AVAILABLE);
    }
}
