//! State module for tracking pipeline progress
//!
//! # Components
//!
//! - `LastPage`: The discovered page count of a search query (no results, or N pages)
//! - `ListingStage`: Whether a listing holds only summary fields or has been enriched

mod listing_stage;
mod page_count;

// Re-export main types
pub use listing_stage::ListingStage;
pub use page_count::LastPage;
