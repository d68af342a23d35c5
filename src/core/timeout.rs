/*!
 * Timeout Values
 *
 * Blocking operations accept either an absolute deadline or a delay relative
 * to the timer's current time.
 */

use std::time::{Duration, Instant};

/// Deadline for a blocking operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Expire at an absolute instant on the timer's clock
    At(Instant),
    /// Expire after a delay measured from when the wait starts
    After(Duration),
}

impl Timeout {
    /// Relative timeout
    pub const fn after(delay: Duration) -> Self {
        Timeout::After(delay)
    }

    /// Absolute timeout
    pub const fn at(deadline: Instant) -> Self {
        Timeout::At(deadline)
    }

    /// Resolve to an absolute deadline given the timer's current time
    ///
    /// Returns `None` when the delay reaches past what the clock can
    /// represent; such a wait is unbounded.
    #[inline]
    pub fn deadline(&self, now: Instant) -> Option<Instant> {
        match *self {
            Timeout::At(deadline) => Some(deadline),
            Timeout::After(delay) => now.checked_add(delay),
        }
    }
}

impl From<Duration> for Timeout {
    fn from(delay: Duration) -> Self {
        Timeout::After(delay)
    }
}

impl From<Instant> for Timeout {
    fn from(deadline: Instant) -> Self {
        Timeout::At(deadline)
    }
}
