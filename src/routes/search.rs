//! Search API route
//!
//! Runs a library search, walks to the requested page, and remembers the raw
//! records of that page for later download lookups.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::search::{fetch_page, format_record, SearchResultRecord};
use crate::state::AppState;

/// Upper bound on results per page
pub const MAX_COUNT: u32 = 100;

/// Create the search router
pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search_books))
}

/// Query parameters for book search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search query
    pub q: String,
    /// 1-based page number (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page (default: 10)
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_page() -> u32 {
    1
}

fn default_count() -> u32 {
    10
}

impl SearchQuery {
    fn validate(&self) -> Result<()> {
        if self.q.trim().is_empty() {
            return Err(AppError::Validation("q must not be empty".to_string()));
        }
        if self.page == 0 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }
        if self.count == 0 || self.count > MAX_COUNT {
            return Err(AppError::Validation(format!(
                "count must be between 1 and {}",
                MAX_COUNT
            )));
        }
        Ok(())
    }
}

/// Search response
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultRecord>,
    pub total_pages: u32,
    pub current_page: u32,
    /// Exact when the library reports it, otherwise `total_pages * count`
    pub total_results: u64,
}

/// Search books endpoint
///
/// GET /api/search?q=dune&page=2&count=10
async fn search_books(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>> {
    let Query(query) = query?;
    query.validate()?;

    let mut paginator = state.client().search(&query.q, query.count).await?;
    let fetch = fetch_page(paginator.as_mut(), query.page).await?;

    tracing::debug!(
        "Search {:?}: requested page {}, reached page {} of {}, {} records",
        query.q,
        query.page,
        fetch.reached_page,
        fetch.total_pages,
        fetch.records.len()
    );

    let results = fetch.records.iter().map(format_record).collect();
    let total_results = fetch
        .total_results
        .unwrap_or(u64::from(fetch.total_pages) * u64::from(query.count));

    state.page_cache().put(query.page, fetch.records).await;

    Ok(Json(SearchResponse {
        results,
        total_pages: fetch.total_pages,
        current_page: query.page,
        total_results,
    }))
}
