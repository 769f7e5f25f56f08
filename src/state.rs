//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::search::PageCache;
use crate::zlib::LibraryClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    client: Arc<dyn LibraryClient>,
    page_cache: PageCache,
}

impl AppState {
    /// Create a new application state
    ///
    /// `client` must already be logged in; it is only read from here on.
    pub fn new(config: Config, client: Arc<dyn LibraryClient>) -> Self {
        let page_cache = PageCache::from_config(&config.cache);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                client,
                page_cache,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the library client
    pub fn client(&self) -> &dyn LibraryClient {
        self.inner.client.as_ref()
    }

    /// Get the search page cache
    pub fn page_cache(&self) -> &PageCache {
        &self.inner.page_cache
    }
}
