//! Route modules for the ZLibrary API server

pub mod books;
pub mod health;
pub mod search;

use axum::Router;

use crate::state::AppState;

/// Routes served under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(search::router())
        .merge(books::router())
        .merge(health::router())
}
