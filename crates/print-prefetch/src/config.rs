//! Window sizing.

use print_types::PrintError;

/// Hard cap on concurrently in-flight rows.
pub const DEFAULT_MAX_WINDOW: usize = 10;
/// Rows launched before the consumer asks for the first one.
pub const DEFAULT_INITIAL_FILL: usize = 6;

/// Configuration for the prefetch window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrefetchConfig {
    /// Maximum number of rows launched but not yet consumed.
    pub max_window: usize,

    /// Rows launched by [`start`](crate::PrefetchScheduler::start).
    /// Must not exceed `max_window`.
    pub initial_fill: usize,
}

impl PrefetchConfig {
    /// Validated constructor: `1 <= initial_fill <= max_window`.
    pub fn new(max_window: usize, initial_fill: usize) -> Result<Self, PrintError> {
        if initial_fill == 0 || initial_fill > max_window {
            return Err(PrintError::InvalidWindow {
                max_window,
                initial_fill,
            });
        }
        Ok(Self {
            max_window,
            initial_fill,
        })
    }
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            max_window: DEFAULT_MAX_WINDOW,
            initial_fill: DEFAULT_INITIAL_FILL,
        }
    }
}
