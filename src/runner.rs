//! Run Coordinator.
//!
//! Drives the rows through the [`LayerProcessor`] with the configured
//! [`Strategy`] and folds every outcome into [`RunCounters`]. The counters
//! live on the coordinator's task only; spawned tasks hand their outcome back
//! instead of touching shared state.

use std::any::Any;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use print_prefetch::{Delivery, Pacing, PrefetchScheduler, PrefetchSource, SchedulerStats};
use print_types::{LayerError, LayerOutcome, RunCounters};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::args::{RunConfig, Strategy};
use crate::processor::LayerProcessor;
use crate::prompt::{choose_on_error, confirm, sequential_prompt, ErrorChoice, PromptPacing, Prompter};
use crate::rows::RowSource;

/// Final state of a run, handed to the summary reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub counters: RunCounters,
    /// The operator stopped the run before every row was resolved.
    pub aborted: bool,
    /// Scheduler counters for prefetch-paced runs.
    pub prefetch: Option<SchedulerStats>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct PrintRunner {
    config: RunConfig,
    rows: Arc<RowSource>,
    processor: Arc<LayerProcessor>,
    counters: RunCounters,
}

impl PrintRunner {
    pub fn new(config: RunConfig, rows: RowSource, processor: LayerProcessor) -> Self {
        let counters = RunCounters::new(rows.len());
        Self {
            config,
            rows: Arc::new(rows),
            processor: Arc::new(processor),
            counters,
        }
    }

    /// Run every row (or until the operator aborts).
    ///
    /// `prompter` is only consulted by supervised strategies.
    pub async fn run(mut self, prompter: &mut (dyn Prompter + '_)) -> RunReport {
        let strategy = self.config.strategy;
        let started_at = Utc::now();
        info!(
            print_name = %self.config.print_name,
            mode = %self.config.mode,
            ?strategy,
            layers = self.rows.len(),
            "starting print run"
        );

        let mut prefetch = None;
        let aborted = match strategy {
            Strategy::Sequential { supervised } => self.run_sequential(prompter, supervised).await,
            Strategy::FullConcurrency => {
                self.run_concurrent().await;
                false
            }
            Strategy::PrefetchPaced => {
                let (aborted, stats) = self.run_prefetch(prompter).await;
                prefetch = Some(stats);
                aborted
            }
        };

        let finished_at = Utc::now();
        info!(
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            successful = self.counters.successful_layers,
            failed = self.counters.failed_layers,
            total = self.counters.total_layers,
            aborted,
            "print run finished"
        );

        RunReport {
            counters: self.counters,
            aborted,
            prefetch,
            started_at,
            finished_at,
        }
    }

    async fn run_sequential(&mut self, prompter: &mut (dyn Prompter + '_), supervised: bool) -> bool {
        let rows = Arc::clone(&self.rows);
        for record in rows.iter() {
            if supervised {
                let prompt = sequential_prompt(record.layer_number());
                if confirm(&mut *prompter, &prompt).await == Pacing::Cancel {
                    println!("Printing aborted by user.");
                    return true;
                }
                if let Some(err) = record.inherent_error() {
                    let choice = choose_on_error(&mut *prompter, record.layer_number(), err).await;
                    if choice == ErrorChoice::End {
                        println!("Printing aborted by user due to error.");
                        return true;
                    }
                }
            }

            let outcome = self.processor.process(record).await;
            self.resolve(&outcome, false);

            if !supervised && !self.config.layer_delay.is_zero() {
                tokio::time::sleep(self.config.layer_delay).await;
            }
        }
        false
    }

    async fn run_concurrent(&mut self) {
        let semaphore = self
            .config
            .automatic_concurrency
            .map(|cap| Arc::new(Semaphore::new(cap)));

        let mut join_set = JoinSet::new();
        for index in 0..self.rows.len() {
            let rows = Arc::clone(&self.rows);
            let processor = Arc::clone(&self.processor);
            let semaphore = semaphore.clone();
            join_set.spawn(async move {
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                process_row(&rows, &processor, index).await
            });
        }

        let mut pending: BTreeSet<usize> = (0..self.rows.len()).collect();
        let mut last_join_error = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => {
                    pending.remove(&outcome.index);
                    self.resolve(&outcome, false);
                }
                Err(err) => {
                    error!(error = %err, "layer task failed");
                    last_join_error = Some(err.to_string());
                }
            }
        }

        // A lost task cannot name its row, so whatever never reported is
        // resolved here.
        for index in pending {
            let reason = last_join_error
                .clone()
                .unwrap_or_else(|| "task did not report".to_string());
            let outcome = LayerOutcome::failed(
                index,
                self.rows.layer_number(index),
                LayerError::Task(reason),
            );
            self.resolve(&outcome, false);
        }
    }

    async fn run_prefetch(&mut self, prompter: &mut (dyn Prompter + '_)) -> (bool, SchedulerStats) {
        let job = Arc::new(RowJob {
            rows: Arc::clone(&self.rows),
            processor: Arc::clone(&self.processor),
        });
        let mut scheduler = PrefetchScheduler::start(job, self.config.prefetch);
        let mut pacing = PromptPacing::new(prompter);

        let aborted = loop {
            match scheduler.next(&mut pacing).await {
                Delivery::Ready { index, output } => {
                    debug!(index, in_flight = scheduler.in_flight(), "prefetched layer delivered");
                    self.resolve(&output, true);
                }
                Delivery::Cancelled => {
                    println!("Printing aborted by user.");
                    break true;
                }
                Delivery::Exhausted => break false,
            }
        };

        let stats = scheduler.stats();
        info!(
            launched = stats.launched,
            delivered = stats.delivered,
            abandoned = stats.abandoned,
            peak_in_flight = stats.peak_in_flight,
            fallback_launches = stats.fallback_launches,
            task_failures = stats.task_failures,
            "prefetch scheduler finished"
        );
        (aborted, stats)
    }

    /// Fold one outcome and report it to the operator.
    fn resolve(&mut self, outcome: &LayerOutcome, prefetched: bool) {
        self.counters.fold(outcome);
        match outcome.error_detail() {
            None if prefetched => {
                println!("Layer {} printed successfully (prefetched).", outcome.layer_number)
            }
            None => println!("Layer {} printed successfully.", outcome.layer_number),
            Some(detail) => println!("Layer {} failed: {}", outcome.layer_number, detail),
        }
    }
}

/// Rows of one run, exposed to the prefetch scheduler.
struct RowJob {
    rows: Arc<RowSource>,
    processor: Arc<LayerProcessor>,
}

#[async_trait]
impl PrefetchSource for RowJob {
    type Output = LayerOutcome;

    fn total_rows(&self) -> usize {
        self.rows.len()
    }

    async fn produce(&self, index: usize) -> LayerOutcome {
        process_row(&self.rows, &self.processor, index).await
    }

    fn on_task_failure(&self, index: usize, reason: String) -> LayerOutcome {
        LayerOutcome::failed(index, self.rows.layer_number(index), LayerError::Task(reason))
    }
}

/// Process row `index`, turning a panic into a failed outcome for that row.
async fn process_row(rows: &RowSource, processor: &LayerProcessor, index: usize) -> LayerOutcome {
    let Some(record) = rows.get(index) else {
        return LayerOutcome::failed(
            index,
            rows.layer_number(index),
            LayerError::Task(format!("row {index} is out of range")),
        );
    };

    match AssertUnwindSafe(processor.process(record)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            error!(index, layer = record.layer_number(), reason = %reason, "layer processing panicked");
            LayerOutcome::failed(index, record.layer_number(), LayerError::Task(reason))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "layer processing panicked".to_string()
    }
}
