//! Book API endpoints
//!
//! - Book lookup by id, returned exactly as the library sent it
//! - Download link resolution for books seen in a recent search

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::zlib::Record;

/// Download link response
#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub download_url: String,
}

/// Create the books router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/book/:book_id", get(get_book))
        .route("/download/:book_id", get(get_download))
}

/// Get a book by id
///
/// The record is not passed through the search formatter.
async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<Record>> {
    tracing::debug!("Looking up book with ID: '{}'", book_id);

    let book = state
        .client()
        .get_by_id(&book_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

    Ok(Json(book))
}

/// Resolve the download link of a book from a recent search
async fn get_download(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<DownloadResponse>> {
    let record = state
        .page_cache()
        .find_by_id(&book_id)
        .await
        .ok_or_else(|| {
            tracing::warn!("Book '{}' not found in search cache", book_id);
            AppError::NotFound("Book not found in recent search results".to_string())
        })?;

    let detail = state.client().fetch_detail(&record).await?;
    let download_url = detail
        .scalar("download_url")
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::NotFound("Download URL not available".to_string()))?;

    Ok(Json(DownloadResponse { download_url }))
}
