use std::fmt;

/// How far a listing has progressed through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingStage {
    /// Core fields only, written by the listing-scraping phase
    Summary,

    /// Detail fields filled in by the detail-scraping phase
    Enriched,
}

impl ListingStage {
    /// Derives the stage from the apply-link column, which the detail phase
    /// always fills (with a placeholder if nothing was found)
    pub fn from_apply_link(apply_link: Option<&str>) -> Self {
        match apply_link {
            Some(_) => Self::Enriched,
            None => Self::Summary,
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Enriched => "enriched",
        }
    }
}

impl fmt::Display for ListingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
