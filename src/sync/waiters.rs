/*!
 * Waiter List
 *
 * FIFO list of parked waiters for long-lived primitives. Timed-out or
 * cancelled waiters are left in place as tombstones and skipped by whoever
 * serves the list; every `gc_interval`-th stale event rebuilds the list
 * without them, so a retry loop waiting with a short timeout forever cannot
 * grow it without bound.
 */

use crate::core::limits::INITIAL_WAITER_CAPACITY;
use crate::runtime::Deferred;
use std::collections::VecDeque;

pub(crate) struct WaiterList<T> {
    waiters: VecDeque<Deferred<T>>,
    stale_events: usize,
    gc_interval: usize,
}

impl<T> WaiterList<T> {
    pub fn new(gc_interval: usize) -> Self {
        Self {
            waiters: VecDeque::with_capacity(INITIAL_WAITER_CAPACITY),
            stale_events: 0,
            gc_interval: gc_interval.max(1),
        }
    }

    #[inline]
    pub fn push(&mut self, waiter: Deferred<T>) {
        self.waiters.push_back(waiter);
    }

    /// Pop the oldest waiter that has not been settled yet
    pub fn pop_live(&mut self) -> Option<Deferred<T>> {
        while let Some(waiter) = self.waiters.pop_front() {
            if !waiter.is_done() {
                return Some(waiter);
            }
        }
        None
    }

    /// Record one timed-out or cancelled waiter; compacts periodically
    ///
    /// Returns the number of tombstones removed (0 when no compaction ran).
    pub fn collect_garbage(&mut self) -> usize {
        self.stale_events += 1;
        if self.stale_events < self.gc_interval {
            return 0;
        }
        self.stale_events = 0;

        let before = self.waiters.len();
        self.waiters.retain(|waiter| !waiter.is_done());
        let removed = before - self.waiters.len();
        tracing::debug!(before, removed, "Compacted waiter list");
        removed
    }

    /// Entries in the list, tombstones included
    #[inline]
    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}
