//! Fatal, pre-run errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole run before any output is produced.
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Invalid mode selected: '{0}'. Please choose 'supervised' or 'automatic'.")]
    InvalidMode(String),

    #[error("Error loading CSV file {path}: {reason}")]
    InputParse { path: PathBuf, reason: String },

    #[error("invalid prefetch window: initial fill {initial_fill} must be between 1 and max window {max_window}")]
    InvalidWindow {
        max_window: usize,
        initial_fill: usize,
    },
}
