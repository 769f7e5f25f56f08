//! Library client traits
//!
//! The route handlers only see these traits; the HTTP implementation lives in
//! [`super::EapiClient`] and tests substitute in-memory doubles.

use async_trait::async_trait;

use super::types::{Record, UpstreamError};

/// An authenticated connection to the digital library
#[async_trait]
pub trait LibraryClient: Send + Sync {
    /// Start a search
    ///
    /// The returned paginator has already fetched the first page.
    async fn search(
        &self,
        query: &str,
        results_per_page: u32,
    ) -> Result<Box<dyn Paginator>, UpstreamError>;

    /// Look up a single book, `None` if the library does not know the id
    async fn get_by_id(&self, id: &str) -> Result<Option<Record>, UpstreamError>;

    /// Fetch the full detail of a search record
    ///
    /// When a download link is available it is exposed as `download_url`.
    async fn fetch_detail(&self, record: &Record) -> Result<Record, UpstreamError>;
}

/// Forward-only cursor over the results of one search
#[async_trait]
pub trait Paginator: Send {
    /// Records of the current page
    fn result(&self) -> &[Record];

    /// Total number of pages reported by the library
    fn total_pages(&self) -> u32;

    /// Exact number of matching records, if the library reported one
    fn total_results(&self) -> Option<u64>;

    /// Advance to the next page and return its records
    ///
    /// An empty batch means there are no further results.
    async fn next(&mut self) -> Result<Vec<Record>, UpstreamError>;
}
