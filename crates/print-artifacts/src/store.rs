//! Artifact persistence.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use print_types::WorkRecord;
use thiserror::Error;
use tracing::trace;

use crate::paths::{atomic_write, layer_data_path, layer_image_path};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize layer {layer}: {source}")]
    Serialize {
        layer: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where layer artifacts go.
///
/// Keys are derived from the layer number. Rows sharing a layer number share
/// a location; each write replaces the file whole, so concurrent writers
/// need no locking and the last one wins.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist the serialized record. Returns where it was written.
    async fn write_record(&self, record: &WorkRecord) -> Result<PathBuf, ArtifactError>;

    /// Persist a fetched image for the layer. Returns where it was written.
    async fn write_image(&self, layer_number: &str, bytes: &[u8]) -> Result<PathBuf, ArtifactError>;
}

/// Filesystem-backed store rooted at the run's output folder.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    async fn write(path: PathBuf, bytes: &[u8]) -> Result<PathBuf, ArtifactError> {
        match atomic_write(&path, bytes).await {
            Ok(()) => {
                trace!(path = %path.display(), bytes = bytes.len(), "artifact written");
                Ok(path)
            }
            Err(source) => Err(ArtifactError::Io { path, source }),
        }
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn write_record(&self, record: &WorkRecord) -> Result<PathBuf, ArtifactError> {
        let json = record
            .to_pretty_json()
            .map_err(|source| ArtifactError::Serialize {
                layer: record.layer_number().to_string(),
                source,
            })?;
        let path = layer_data_path(&self.root, record.layer_number());
        Self::write(path, json.as_bytes()).await
    }

    async fn write_image(&self, layer_number: &str, bytes: &[u8]) -> Result<PathBuf, ArtifactError> {
        let path = layer_image_path(&self.root, layer_number);
        Self::write(path, bytes).await
    }
}
