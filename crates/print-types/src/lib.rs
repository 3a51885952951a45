//! Shared types for the layer-print workspace.
//!
//! This crate provides the data model every other crate in the workspace
//! speaks, so the transport, artifact store, scheduler and coordinator never
//! depend on each other just to exchange values.
//!
//! ## Record and outcome types
//!
//! - [`WorkRecord`](record::WorkRecord) - one input row, immutable once read
//! - [`LayerOutcome`](outcome::LayerOutcome) - result of processing one record
//! - [`RunCounters`](outcome::RunCounters) - single-writer aggregation of outcomes
//!
//! ## Errors
//!
//! - [`LayerError`](outcome::LayerError) - per-row failures, recovered locally
//! - [`PrintError`](error::PrintError) - fatal, pre-run failures

pub mod error;
pub mod outcome;
pub mod record;

pub use error::PrintError;
pub use outcome::{LayerError, LayerOutcome, RunCounters};
pub use record::{
    WorkRecord, ERROR_COLUMN, IMAGE_URL_COLUMN, LAYER_NUMBER_COLUMN, SUCCESS_SENTINEL,
    UNKNOWN_LAYER,
};

use std::time::Duration;

/// Default timeout applied to every image fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// How image fetches are performed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Upper bound for a single fetch, connect through last body byte.
    pub timeout: Duration,
    /// Skip TLS certificate verification. The printers this talks to serve
    /// self-signed certificates on the local network.
    pub accept_invalid_certs: bool,
}

impl FetchPolicy {
    /// Create a policy with the given timeout in seconds.
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
            ..Self::default()
        }
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            accept_invalid_certs: true,
        }
    }
}
