//! Output folder layout and artifact persistence for print runs.
//!
//! This crate provides:
//! - [`paths`]: where every artifact of a run lives under the output folder
//! - [`ArtifactStore`]: the persistence capability used by the layer processor
//! - [`FsArtifactStore`]: filesystem implementation with write-then-rename

pub mod paths;
pub mod store;

pub use store::{ArtifactError, ArtifactStore, FsArtifactStore};
