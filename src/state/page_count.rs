use std::fmt;

/// Discovered page count of a search query
///
/// A query whose page count is still unknown has no `LastPage` at all
/// (`Option<LastPage>` is `None`); the database stores that as NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LastPage {
    /// The site reported no results for the query
    NoResults,

    /// The query has this many result pages (always >= 1)
    Pages(u32),
}

impl LastPage {
    /// Builds a page count from a raw number, treating 0 as "no results"
    pub fn from_count(count: u32) -> Self {
        if count == 0 {
            Self::NoResults
        } else {
            Self::Pages(count)
        }
    }

    /// Number of result pages (0 for no results)
    pub fn count(&self) -> u32 {
        match self {
            Self::NoResults => 0,
            Self::Pages(n) => *n,
        }
    }

    /// Returns true if listing pages exist for this query
    pub fn has_pages(&self) -> bool {
        self.count() > 0
    }

    /// Converts the page count to its database column value
    pub fn to_db_value(&self) -> i64 {
        i64::from(self.count())
    }

    /// Parses a nullable database column value
    ///
    /// NULL means undiscovered. Negative values are not produced by this crate
    /// and are read back as undiscovered so the query gets probed again.
    pub fn from_db_value(value: Option<i64>) -> Option<Self> {
        let value = value?;
        u32::try_from(value).ok().map(Self::from_count)
    }
}

impl fmt::Display for LastPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResults => write!(f, "no results"),
            Self::Pages(1) => write!(f, "1 page"),
            Self::Pages(n) => write!(f, "{} pages", n),
        }
    }
}
