//! Pagination walker
//!
//! The library only exposes a forward cursor, so reaching page N means
//! stepping the cursor N-1 times from the first page loaded by `search`.

use crate::zlib::{Paginator, Record, UpstreamError};

/// Records for a requested page
#[derive(Debug, Clone)]
pub struct PageFetch {
    pub records: Vec<Record>,
    pub total_pages: u32,
    pub total_results: Option<u64>,
    /// Page the records actually belong to
    ///
    /// Lower than the requested page when the results ran out first.
    pub reached_page: u32,
}

/// Advance `paginator` to `page` (1-based)
///
/// Page 1 is the batch already held by the paginator. If the results run out
/// before the requested page, the last non-empty page is returned. Any
/// upstream error aborts the walk.
pub async fn fetch_page<P>(paginator: &mut P, page: u32) -> Result<PageFetch, UpstreamError>
where
    P: Paginator + ?Sized,
{
    let mut records = paginator.result().to_vec();
    let mut reached_page = 1;

    for _ in 1..page {
        let batch = paginator.next().await?;
        if batch.is_empty() {
            tracing::debug!(
                "Results ended at page {} before requested page {}",
                reached_page,
                page
            );
            break;
        }
        records = batch;
        reached_page += 1;
    }

    Ok(PageFetch {
        records,
        total_pages: paginator.total_pages(),
        total_results: paginator.total_results(),
        reached_page,
    })
}
