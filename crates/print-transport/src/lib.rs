//! Print Transport Layer
//!
//! Fetches layer images for the print runner.
//!
//! This crate provides:
//! - [`Fetcher`]: the capability the layer processor depends on
//! - [`http::HttpFetcher`]: ureq-backed implementation, run on the blocking pool
//! - [`testing::StaticFetcher`]: canned responses for tests and dry runs
//!
//! # Example
//!
//! ```ignore
//! use print_transport::{Fetcher, HttpFetcher};
//! use print_types::FetchPolicy;
//!
//! let fetcher = HttpFetcher::new(FetchPolicy::default())?;
//! let bytes = fetcher.fetch("https://printer.local/layer_1.png", policy.timeout).await?;
//! ```

pub mod error;
pub mod http;
pub mod testing;
mod tls;

pub use error::FetchError;
pub use http::HttpFetcher;

use async_trait::async_trait;
use std::time::Duration;

/// Retrieve the bytes behind a resource locator.
///
/// Implementations must be safe to call from many tasks at once.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}
