//! Print Prefetch
//!
//! Overlaps the I/O of upcoming rows with the wait for a human (or scripted)
//! confirmation, while bounding how much work is in flight.
//!
//! This crate provides:
//! - [`scheduler`]: [`PrefetchScheduler`], which launches rows ahead of the
//!   consumer and hands results back strictly in row order
//! - [`window`]: [`PrefetchWindow`], the bookkeeping behind the scheduler
//! - [`pacing`]: the [`PacingSignal`] rendezvous and a scripted implementation
//! - [`config`]: [`PrefetchConfig`] window sizing
//!
//! # Example
//!
//! ```ignore
//! use print_prefetch::{Delivery, PrefetchConfig, PrefetchScheduler, ScriptedPacing};
//!
//! let mut scheduler = PrefetchScheduler::start(source, PrefetchConfig::default());
//! let mut pacing = ScriptedPacing::proceed_all();
//! while let Delivery::Ready { output, .. } = scheduler.next(&mut pacing).await {
//!     fold(output);
//! }
//! ```

pub mod config;
pub mod pacing;
pub mod scheduler;
pub mod window;

pub use config::{PrefetchConfig, DEFAULT_INITIAL_FILL, DEFAULT_MAX_WINDOW};
pub use pacing::{Pacing, PacingSignal, ScriptedPacing};
pub use scheduler::{Delivery, PrefetchScheduler, PrefetchSource, SchedulerStats};
pub use window::PrefetchWindow;
