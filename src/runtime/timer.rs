/*!
 * Timer Service
 *
 * Schedules callbacks at absolute instants and cancels them on demand.
 * Primitives use it to fail a parked waiter once its deadline passes.
 */

use super::deferred::Deferred;
use crate::core::{SyncError, Timeout};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Callback fired by a timer
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Opaque handle identifying a scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub(crate) u64);

impl TimerHandle {
    /// Raw identifier (for diagnostics)
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Timer/scheduler contract consumed by every primitive
///
/// Implementations must be:
/// - **Idempotent on cancel**: cancelling a fired or unknown handle is a no-op
/// - **Lock-free at fire time**: callbacks run without any timer lock held,
///   since a callback commonly cancels other handles
pub trait Timer: Send + Sync + fmt::Debug {
    /// Current time on this timer's clock
    fn now(&self) -> Instant;

    /// Schedule `callback` to run at `deadline`
    fn call_at(&self, deadline: Instant, callback: TimerCallback) -> Result<TimerHandle, SyncError>;

    /// Cancel a scheduled callback
    fn cancel(&self, handle: TimerHandle);

    /// Timer name for debugging
    fn name(&self) -> &'static str;
}

/// Arm `on_expire` to fire at the timeout, and disarm it once `waiter` settles
///
/// If the timer cannot schedule, the waiter is failed immediately with the
/// timer's error so the caller never parks without its requested bound.
pub(crate) fn arm_timeout<T, F>(
    timer: &Arc<dyn Timer>,
    waiter: &Deferred<T>,
    timeout: Timeout,
    on_expire: F,
) where
    F: FnOnce() + Send + 'static,
{
    let Some(deadline) = timeout.deadline(timer.now()) else {
        tracing::trace!(?timeout, "Timeout beyond clock range, waiting unbounded");
        return;
    };
    match timer.call_at(deadline, Box::new(on_expire)) {
        Ok(handle) => {
            let timer = Arc::clone(timer);
            waiter.on_done(move || timer.cancel(handle));
        }
        Err(err) => {
            tracing::warn!(timer = timer.name(), error = %err, "Could not arm timeout");
            waiter.set_error(err);
        }
    }
}
