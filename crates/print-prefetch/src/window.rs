//! Prefetch window bookkeeping.
//!
//! Holds the three cursors of a paced run and the map of launched, not yet
//! consumed rows. It owns no runtime resources itself; the scheduler decides
//! what a handle is.
//!
//! Invariants, checked in debug builds after every mutation:
//! - `consumer_index <= next_to_schedule <= total_rows`
//! - every key of `in_flight` lies in `[consumer_index, next_to_schedule)`

use std::collections::BTreeMap;

#[derive(Debug)]
pub struct PrefetchWindow<H> {
    total_rows: usize,
    next_to_schedule: usize,
    consumer_index: usize,
    in_flight: BTreeMap<usize, H>,
}

impl<H> PrefetchWindow<H> {
    pub fn new(total_rows: usize) -> Self {
        Self {
            total_rows,
            next_to_schedule: 0,
            consumer_index: 0,
            in_flight: BTreeMap::new(),
        }
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn next_to_schedule(&self) -> usize {
        self.next_to_schedule
    }

    pub fn consumer_index(&self) -> usize {
        self.consumer_index
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Row indices currently launched and not consumed, ascending.
    pub fn in_flight_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.in_flight.keys().copied()
    }

    /// Every row has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.consumer_index == self.total_rows
    }

    pub fn is_scheduled(&self, index: usize) -> bool {
        self.in_flight.contains_key(&index)
    }

    /// Index of the next row to launch, if rows remain and fewer than `limit`
    /// are in flight.
    pub fn next_launch(&self, limit: usize) -> Option<usize> {
        (self.next_to_schedule < self.total_rows && self.in_flight.len() < limit)
            .then_some(self.next_to_schedule)
    }

    /// Record the launch of row `next_to_schedule`.
    ///
    /// Rows are launched strictly in order, so each index is scheduled at
    /// most once.
    pub fn record_launch(&mut self, handle: H) -> usize {
        let index = self.next_to_schedule;
        debug_assert!(index < self.total_rows, "launch past end of input");
        let previous = self.in_flight.insert(index, handle);
        debug_assert!(previous.is_none(), "row {index} launched twice");
        self.next_to_schedule += 1;
        self.check_invariants();
        index
    }

    /// Handle of the row the consumer is waiting for.
    pub fn current_mut(&mut self) -> Option<&mut H> {
        self.in_flight.get_mut(&self.consumer_index)
    }

    /// Remove the consumer's row and advance the consumer cursor.
    ///
    /// Returns `None` when the row was never launched; the cursor does not
    /// move in that case.
    pub fn retire_current(&mut self) -> Option<(usize, H)> {
        let index = self.consumer_index;
        let handle = self.in_flight.remove(&index)?;
        self.consumer_index += 1;
        self.check_invariants();
        Some((index, handle))
    }

    /// Remove every pending handle, e.g. on cancellation.
    pub fn drain(&mut self) -> Vec<(usize, H)> {
        std::mem::take(&mut self.in_flight).into_iter().collect()
    }

    fn check_invariants(&self) {
        debug_assert!(self.consumer_index <= self.next_to_schedule);
        debug_assert!(self.next_to_schedule <= self.total_rows);
        debug_assert!(self
            .in_flight
            .keys()
            .all(|k| (self.consumer_index..self.next_to_schedule).contains(k)));
    }
}
