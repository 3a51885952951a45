//! HTTP image fetcher.

use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;
use print_types::FetchPolicy;
use tracing::{debug, trace};

use crate::{tls, FetchError, Fetcher};

/// Largest image body accepted for a single layer.
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Fetches images with a blocking ureq agent on tokio's blocking pool.
///
/// The agent pools connections internally, so one `HttpFetcher` is shared by
/// every in-flight layer.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Build a fetcher for the given policy.
    pub fn new(policy: FetchPolicy) -> Result<Self, FetchError> {
        let mut builder = ureq::AgentBuilder::new().timeout(policy.timeout);
        if policy.accept_invalid_certs {
            builder = builder.tls_config(tls::insecure_client_config()?);
        }
        Ok(Self {
            agent: builder.build(),
        })
    }

    fn fetch_blocking(agent: &ureq::Agent, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let response = agent.get(url).timeout(timeout).call()?;
        trace!(url, status = response.status(), "image response");

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let agent = self.agent.clone();
        let owned_url = url.to_string();
        let bytes = tokio::task::spawn_blocking(move || {
            Self::fetch_blocking(&agent, &owned_url, timeout)
        })
        .await
        .map_err(|e| FetchError::TaskFailed(e.to_string()))??;

        debug!(url, bytes = bytes.len(), "fetched image");
        Ok(bytes)
    }
}
