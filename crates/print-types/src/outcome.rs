//! Per-row outcomes and run aggregation.

use thiserror::Error;

/// Why a single layer failed.
///
/// Precedence when several could apply to one row is fixed: a write failure
/// stops the row before any fetch, a fetch failure stops it before the
/// inherent error is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    #[error("write error: {0}")]
    Write(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("inherent error: {0}")]
    Inherent(String),

    /// The task processing the row never produced an outcome.
    #[error("task failed: {0}")]
    Task(String),
}

/// Result of processing one [`WorkRecord`](crate::WorkRecord).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerOutcome {
    pub index: usize,
    pub layer_number: String,
    pub error: Option<LayerError>,
}

impl LayerOutcome {
    pub fn succeeded(index: usize, layer_number: impl Into<String>) -> Self {
        Self {
            index,
            layer_number: layer_number.into(),
            error: None,
        }
    }

    pub fn failed(index: usize, layer_number: impl Into<String>, error: LayerError) -> Self {
        Self {
            index,
            layer_number: layer_number.into(),
            error: Some(error),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Human readable failure detail, `None` on success.
    pub fn error_detail(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

/// Counters for one print run.
///
/// Owned by the coordinator and mutated only through [`RunCounters::fold`],
/// one outcome at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub total_layers: usize,
    pub successful_layers: usize,
    pub failed_layers: usize,
    pub error_log: Vec<String>,
}

impl RunCounters {
    pub fn new(total_layers: usize) -> Self {
        Self {
            total_layers,
            ..Self::default()
        }
    }

    /// Apply one outcome.
    pub fn fold(&mut self, outcome: &LayerOutcome) {
        match outcome.error_detail() {
            None => self.successful_layers += 1,
            Some(detail) => {
                self.failed_layers += 1;
                self.error_log
                    .push(format!("Layer {}: {}", outcome.layer_number, detail));
            }
        }
    }

    /// Number of outcomes folded so far.
    pub fn processed(&self) -> usize {
        self.successful_layers + self.failed_layers
    }

    /// Every row was resolved (no early abort).
    pub fn is_complete(&self) -> bool {
        self.processed() == self.total_layers
    }
}
