//! Canned fetcher for tests.
//!
//! Provides a [`Fetcher`] whose responses are fixed up front, with optional
//! per-URL latency so tests can force completions out of row order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::{FetchError, Fetcher};

#[derive(Clone)]
enum Canned {
    Bytes(Vec<u8>),
    Status(u16),
    Unreachable,
}

/// Fetcher backed by an in-memory URL table.
///
/// # Example
///
/// ```ignore
/// let fetcher = StaticFetcher::new()
///     .with_image("https://printer.local/1.png", b"png".to_vec())
///     .with_status("https://printer.local/2.png", 404)
///     .with_delay("https://printer.local/1.png", Duration::from_millis(50));
/// ```
#[derive(Clone, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Canned>,
    delays: HashMap<String, Duration>,
    calls: Arc<AtomicUsize>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), Canned::Bytes(bytes));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Canned::Status(status));
        self
    }

    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), Canned::Unreachable);
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Number of fetches attempted so far, across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(url) {
            if *delay > timeout {
                tokio::time::sleep(timeout).await;
                return Err(FetchError::Transport(format!("{url}: timed out")));
            }
            tokio::time::sleep(*delay).await;
        }

        match self.responses.get(url).cloned() {
            Some(Canned::Bytes(bytes)) => Ok(bytes),
            Some(Canned::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            Some(Canned::Unreachable) => Err(FetchError::Transport(format!(
                "{url}: connection refused"
            ))),
            None => Err(FetchError::NotFound(url.to_string())),
        }
    }
}
