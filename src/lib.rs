//! Layer-by-layer print runner.
//!
//! Reads a CSV file of layer descriptions, persists each layer's data and
//! image under an output folder, and reports aggregate results.
//!
//! **Execution strategies**
//! - Sequential: one row at a time, optionally confirmed interactively.
//! - Full concurrency: every row spawned at once (optionally capped).
//! - Prefetch-paced: a bounded window of rows runs ahead of an external
//!   pacing signal, see [`print_prefetch::PrefetchScheduler`].
//!
//! Outcomes are folded into [`print_types::RunCounters`] by the coordinator
//! alone, whatever the strategy.

pub mod args;
pub mod chart;
pub mod logging;
pub mod processor;
pub mod prompt;
pub mod rows;
pub mod runner;
pub mod summary;

pub use args::{Args, Mode, RunConfig, Strategy};
pub use processor::LayerProcessor;
pub use rows::RowSource;
pub use runner::{PrintRunner, RunReport};
pub use summary::SummaryReport;
