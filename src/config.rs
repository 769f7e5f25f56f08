//! Configuration management for the ZLibrary API server

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub credentials: Credentials,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the library, without a trailing slash
    pub base_url: String,
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Library login secrets
#[derive(Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of search pages kept for download lookups
    pub max_pages: usize,
    /// Seconds before a cached page expires, 0 disables expiry
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_BASE_URL: &str = "https://z-library.sk";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_PAGES: usize = 64;
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            upstream: UpstreamConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            credentials: Credentials::default(),
            cache: CacheConfig {
                max_pages: DEFAULT_CACHE_PAGES,
                ttl_secs: DEFAULT_CACHE_TTL_SECS,
            },
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// Missing login secrets are left empty; the login call rejects them.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: parse_or(&lookup, "SERVER_PORT", DEFAULT_PORT),
            },
            upstream: UpstreamConfig {
                base_url: lookup("ZLIB_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout_secs: parse_or(&lookup, "ZLIB_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            },
            credentials: Credentials {
                email: lookup("ZLOGIN").unwrap_or_default(),
                password: lookup("ZPASSW").unwrap_or_default(),
            },
            cache: CacheConfig {
                max_pages: parse_or(&lookup, "CACHE_MAX_PAGES", DEFAULT_CACHE_PAGES).max(1),
                ttl_secs: parse_or(&lookup, "CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}
