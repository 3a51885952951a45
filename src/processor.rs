//! Layer Processor: turns one record into exactly one outcome.

use std::sync::Arc;
use std::time::Duration;

use print_artifacts::ArtifactStore;
use print_transport::Fetcher;
use print_types::{LayerError, LayerOutcome, WorkRecord};
use tracing::{debug, info, warn};

/// Processes single rows. Cheap to share between tasks behind an [`Arc`].
#[derive(Clone)]
pub struct LayerProcessor {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ArtifactStore>,
    fetch_timeout: Duration,
}

impl LayerProcessor {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn ArtifactStore>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            store,
            fetch_timeout,
        }
    }

    /// Persist the record, fetch and persist its image, then apply the
    /// record's inherent error.
    ///
    /// Never fails: every problem becomes the outcome's error. A write error
    /// wins over a fetch error, and both win over the inherent error, since
    /// the inherent error is only looked at once the row's I/O is done.
    pub async fn process(&self, record: &WorkRecord) -> LayerOutcome {
        let index = record.index();
        let layer = record.layer_number();

        if let Err(err) = self.store.write_record(record).await {
            warn!(layer, index, error = %err, "failed to write layer data");
            return LayerOutcome::failed(index, layer, LayerError::Write(err.to_string()));
        }

        match record.image_locator() {
            Some(url) => match self.fetcher.fetch(url, self.fetch_timeout).await {
                Ok(bytes) => {
                    if let Err(err) = self.store.write_image(layer, &bytes).await {
                        warn!(layer, index, error = %err, "failed to write layer image");
                        return LayerOutcome::failed(
                            index,
                            layer,
                            LayerError::Write(err.to_string()),
                        );
                    }
                    debug!(layer, url, bytes = bytes.len(), "layer image saved");
                }
                Err(err) => {
                    warn!(layer, url, error = %err, "failed to fetch layer image");
                    return LayerOutcome::failed(index, layer, LayerError::Fetch(err.to_string()));
                }
            },
            None => info!(layer, "no image URL provided for layer"),
        }

        match record.inherent_error() {
            Some(err) => LayerOutcome::failed(index, layer, LayerError::Inherent(err.to_string())),
            None => LayerOutcome::succeeded(index, layer),
        }
    }
}
