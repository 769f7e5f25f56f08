//! ZLibrary API Server
//!
//! Search, book detail and download-link endpoints over a digital library,
//! backed by a single client logged in at startup.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zlibrary_api_server::config::Config;
use zlibrary_api_server::state::AppState;
use zlibrary_api_server::zlib::EapiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the filter so RUST_LOG can live there too
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "zlibrary_api_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Starting ZLibrary API Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Library endpoint: {}", config.upstream.base_url);
    tracing::info!(
        "Search cache: {} pages, ttl {:?}",
        config.cache.max_pages,
        config.cache.ttl()
    );

    // Log in once; the session is shared by every request
    let client = EapiClient::login(&config.upstream, &config.credentials)
        .await
        .context("Failed to log in to the library")?;

    let host = config.server.host.clone();
    let port = config.server.port;

    let app_state = AppState::new(config, Arc::new(client));
    let app = zlibrary_api_server::app(app_state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    let addr: SocketAddr = listener.local_addr().context("Listener has no address")?;
    tracing::info!("ZLibrary API Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
