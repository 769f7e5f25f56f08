//! Digital library client
//!
//! A single client is logged in at startup and shared by every request.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zlibrary_api_server::zlib::{EapiClient, LibraryClient};
//!
//! let client = EapiClient::login(&config.upstream, &config.credentials).await?;
//! let mut paginator = client.search("dune", 10).await?;
//! let first_page = paginator.result();
//! let second_page = paginator.next().await?;
//! ```

mod client;
mod http;
mod types;

pub use client::{LibraryClient, Paginator};
pub use http::{EapiClient, EapiPaginator};
pub use types::{Record, UpstreamError};
