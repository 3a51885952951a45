//! Bounded, order-preserving prefetch scheduler.
//!
//! ## Strategy
//!
//! [`PrefetchScheduler::start`] launches the first `initial_fill` rows as
//! independent tokio tasks. Every [`next`](PrefetchScheduler::next) call then:
//!
//! 1. Returns [`Delivery::Exhausted`] if every row has been consumed.
//! 2. Waits on the caller's [`PacingSignal`]; a cancel aborts all pending
//!    tasks and returns [`Delivery::Cancelled`].
//! 3. Awaits the task for exactly the consumer's row, whichever task finished
//!    first, so results come back in row order.
//! 4. Retires that row and refills the window up to `max_window`.
//!
//! All window mutation happens here, on the consumer's task. Spawned tasks
//! only ever produce a value.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PrefetchConfig;
use crate::pacing::{Pacing, PacingSignal};
use crate::window::PrefetchWindow;

/// Work the scheduler runs ahead of the consumer, addressed by row index.
#[async_trait]
pub trait PrefetchSource: Send + Sync + 'static {
    type Output: Send + 'static;

    fn total_rows(&self) -> usize;

    /// Produce the value for row `index`. Runs on its own task.
    async fn produce(&self, index: usize) -> Self::Output;

    /// Value delivered for a row whose task panicked or was lost.
    fn on_task_failure(&self, index: usize, reason: String) -> Self::Output;
}

/// Result of one [`PrefetchScheduler::next`] call.
#[derive(Debug, PartialEq, Eq)]
pub enum Delivery<T> {
    Ready { index: usize, output: T },
    Cancelled,
    Exhausted,
}

/// Counters for one scheduler lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Rows launched as tasks.
    pub launched: usize,
    /// Outputs handed to the consumer.
    pub delivered: usize,
    /// Tasks aborted by cancellation or drop.
    pub abandoned: usize,
    /// Largest number of rows in flight at once.
    pub peak_in_flight: usize,
    /// Rows launched on demand because they were not prefetched.
    pub fallback_launches: usize,
    /// Tasks that panicked.
    pub task_failures: usize,
}

pub struct PrefetchScheduler<S: PrefetchSource> {
    source: Arc<S>,
    config: PrefetchConfig,
    window: PrefetchWindow<JoinHandle<S::Output>>,
    stats: SchedulerStats,
    cancelled: bool,
}

impl<S: PrefetchSource> PrefetchScheduler<S> {
    /// Launch the initial fill. Must be called from within a tokio runtime.
    pub fn start(source: Arc<S>, config: PrefetchConfig) -> Self {
        let total_rows = source.total_rows();
        let mut scheduler = Self {
            source,
            config,
            window: PrefetchWindow::new(total_rows),
            stats: SchedulerStats::default(),
            cancelled: false,
        };
        scheduler.fill(config.initial_fill.min(config.max_window));
        info!(
            total_rows,
            launched = scheduler.window.in_flight(),
            max_window = config.max_window,
            "prefetch started"
        );
        scheduler
    }

    /// Deliver the next row's output in index order.
    pub async fn next<P>(&mut self, pacing: &mut P) -> Delivery<S::Output>
    where
        P: PacingSignal + ?Sized,
    {
        if self.cancelled {
            return Delivery::Cancelled;
        }
        if self.window.is_exhausted() {
            return Delivery::Exhausted;
        }

        let index = self.window.consumer_index();
        if pacing.wait(index).await == Pacing::Cancel {
            self.cancel();
            return Delivery::Cancelled;
        }

        if !self.window.is_scheduled(index) {
            warn!(index, "row was not prefetched, launching on demand");
            self.stats.fallback_launches += 1;
            self.launch_next();
        }

        let joined = match self.window.current_mut() {
            Some(handle) => handle.await.map_err(|err| err.to_string()),
            None => Err("row was never launched".to_string()),
        };
        // Remove only after the await so a dropped `next` future leaves the
        // handle in the window, where cancellation can still reach it.
        self.window.retire_current();

        let output = match joined {
            Ok(output) => output,
            Err(reason) => {
                warn!(index, %reason, "prefetch task failed");
                self.stats.task_failures += 1;
                self.source.on_task_failure(index, reason)
            }
        };
        self.stats.delivered += 1;

        self.fill(self.config.max_window);
        debug!(
            index,
            in_flight = self.window.in_flight(),
            next_to_schedule = self.window.next_to_schedule(),
            "row delivered"
        );

        Delivery::Ready { index, output }
    }

    /// Abort every pending task. Returns how many were abandoned.
    ///
    /// Later [`next`](Self::next) calls return [`Delivery::Cancelled`].
    pub fn cancel(&mut self) -> usize {
        self.cancelled = true;
        let pending = self.window.drain();
        let abandoned = pending.len();
        for (index, handle) in pending {
            debug!(index, "aborting prefetch task");
            handle.abort();
        }
        self.stats.abandoned += abandoned;
        if abandoned > 0 {
            info!(abandoned, "prefetch cancelled");
        }
        abandoned
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn config(&self) -> PrefetchConfig {
        self.config
    }

    pub fn in_flight(&self) -> usize {
        self.window.in_flight()
    }

    pub fn consumer_index(&self) -> usize {
        self.window.consumer_index()
    }

    pub fn next_to_schedule(&self) -> usize {
        self.window.next_to_schedule()
    }

    fn fill(&mut self, limit: usize) {
        while self.window.next_launch(limit).is_some() {
            self.launch_next();
        }
    }

    fn launch_next(&mut self) {
        let index = self.window.next_to_schedule();
        let source = Arc::clone(&self.source);
        let handle = tokio::spawn(async move { source.produce(index).await });
        self.window.record_launch(handle);

        self.stats.launched += 1;
        self.stats.peak_in_flight = self.stats.peak_in_flight.max(self.window.in_flight());
    }
}

impl<S: PrefetchSource> Drop for PrefetchScheduler<S> {
    fn drop(&mut self) {
        for (_, handle) in self.window.drain() {
            handle.abort();
        }
    }
}
