/*!
 * Manual Timer
 *
 * Deterministic virtual clock. Time only moves when `advance` is called, and
 * due callbacks fire in deadline order (ties in scheduling order). Used for
 * tests, benchmarks and simulations that must not depend on wall-clock time.
 */

use super::timer::{Timer, TimerCallback, TimerHandle};
use crate::core::SyncError;
use ahash::AHashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

struct ManualState {
    now: Instant,
    next_id: u64,
    /// Keyed by (deadline, id) so iteration order is firing order
    scheduled: BTreeMap<(Instant, u64), TimerCallback>,
    /// id -> deadline, for cancellation by handle
    index: AHashMap<u64, Instant>,
}

/// Virtual-clock timer driven explicitly by the caller
pub struct ManualTimer {
    state: Mutex<ManualState>,
}

impl ManualTimer {
    /// Create a timer whose clock starts at the current wall-clock instant
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a timer whose clock starts at `origin`
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            state: Mutex::new(ManualState {
                now: origin,
                next_id: 0,
                scheduled: BTreeMap::new(),
                index: AHashMap::new(),
            }),
        }
    }

    /// Move the clock forward by `delta`, firing every callback that falls due
    ///
    /// Returns the number of callbacks fired.
    pub fn advance(&self, delta: Duration) -> usize {
        let target = self.state.lock().now + delta;
        self.advance_to(target)
    }

    /// Move the clock to `target` (never backwards), firing due callbacks
    pub fn advance_to(&self, target: Instant) -> usize {
        let mut fired = 0;
        loop {
            let callback = {
                let mut state = self.state.lock();
                let due = match state.scheduled.keys().next() {
                    Some(&(deadline, id)) if deadline <= target => Some((deadline, id)),
                    _ => None,
                };
                match due {
                    Some((deadline, id)) => {
                        if deadline > state.now {
                            state.now = deadline;
                        }
                        state.index.remove(&id);
                        state.scheduled.remove(&(deadline, id))
                    }
                    None => {
                        if target > state.now {
                            state.now = target;
                        }
                        None
                    }
                }
            };

            match callback {
                // Fired without the lock held; callbacks may cancel or schedule
                Some(callback) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }
        fired
    }

    /// Fire everything currently scheduled, however far in the future
    pub fn run_all(&self) -> usize {
        let last = self.state.lock().scheduled.keys().next_back().map(|&(deadline, _)| deadline);
        match last {
            Some(deadline) => self.advance_to(deadline),
            None => 0,
        }
    }

    /// Number of callbacks still scheduled
    pub fn pending(&self) -> usize {
        self.state.lock().scheduled.len()
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualTimer")
            .field("now", &state.now)
            .field("pending", &state.scheduled.len())
            .finish()
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> Instant {
        self.state.lock().now
    }

    fn call_at(&self, deadline: Instant, callback: TimerCallback) -> Result<TimerHandle, SyncError> {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.scheduled.insert((deadline, id), callback);
        state.index.insert(id, deadline);
        Ok(TimerHandle(id))
    }

    fn cancel(&self, handle: TimerHandle) {
        let removed = {
            let mut state = self.state.lock();
            match state.index.remove(&handle.0) {
                Some(deadline) => state.scheduled.remove(&(deadline, handle.0)),
                None => None,
            }
        };
        // Drop the callback (and whatever it captured) outside the lock
        drop(removed);
    }

    fn name(&self) -> &'static str {
        "manual"
    }
}
