//! ZLibrary API Server Library
//!
//! HTTP facade over a digital-library search service. The server binary is in
//! main.rs; the router is built here so integration tests can drive it.
//!
//! # Modules
//!
//! - `zlib`: upstream library client (login, search pagination, lookups)
//! - `search`: result formatting, pagination walking, page cache
//! - `routes`: HTTP handlers

pub mod config;
pub mod error;
pub mod routes;
pub mod search;
pub mod state;
pub mod zlib;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router
///
/// CORS allows any origin, method and header, which is only suitable for
/// development.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
