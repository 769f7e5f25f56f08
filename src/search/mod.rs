//! Search pipeline
//!
//! - `paginate`: walks the library cursor to the requested page
//! - `format`: reshapes raw records for API responses
//! - `cache`: remembers served pages for later download lookups

mod cache;
mod format;
mod paginate;

pub use cache::{CacheStats, PageCache};
pub use format::{format_record, SearchResultRecord};
pub use paginate::{fetch_page, PageFetch};
