/*!
 * Condition
 *
 * FIFO park/notify with no associated flag and no associated mutex. Waiters
 * are served strictly in arrival order; timed-out waiters are skipped.
 *
 * # Why no mutex
 *
 * Every state transition happens inside one call, under the condition's own
 * lock, before control returns to the scheduler. A caller that checks its
 * predicate and then calls `wait` within the same turn cannot miss a notify.
 */

use super::waiters::WaiterList;
use crate::core::{SyncConfig, SyncResult, Timeout};
use crate::runtime::{arm_timeout, Deferred, Timer};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tracing::{debug, trace};

struct ConditionInner {
    waiters: Mutex<WaiterList<bool>>,
    timer: Arc<dyn Timer>,
}

impl ConditionInner {
    fn expire(&self, target: &Deferred<bool>) {
        let mut waiters = self.waiters.lock();
        if target.set_result(false).is_ok() {
            debug!("Condition wait timed out");
            waiters.collect_garbage();
        }
    }
}

/// Condition that lets tasks park until notified
///
/// # Examples
///
/// ```no_run
/// use coop_sync::Condition;
///
/// # async fn demo() -> coop_sync::SyncResult<()> {
/// let condition = Condition::new();
/// let waiter = condition.wait(None);
/// condition.notify(1);
/// assert!(waiter.await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Condition {
    inner: Arc<ConditionInner>,
}

impl Condition {
    /// Create with default configuration
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        Self {
            inner: Arc::new(ConditionInner {
                waiters: Mutex::new(WaiterList::new(config.gc_interval)),
                timer: config.timer,
            }),
        }
    }

    /// Park until notified
    ///
    /// Resolves to `true` when notified and `false` when the timeout passes
    /// first.
    pub fn wait(&self, timeout: Option<Timeout>) -> Notified {
        let waiter = Deferred::new();
        self.inner.waiters.lock().push(waiter.clone());
        trace!("Condition waiter parked");

        if let Some(timeout) = timeout {
            let weak = Arc::downgrade(&self.inner);
            let target = waiter.clone();
            arm_timeout(&self.inner.timer, &waiter, timeout, move || match weak.upgrade() {
                Some(inner) => inner.expire(&target),
                None => {
                    let _ = target.set_result(false);
                }
            });
        }

        Notified {
            waiter,
            condition: Arc::downgrade(&self.inner),
        }
    }

    /// Wake up to `n` live waiters in arrival order
    ///
    /// Returns the number of waiters woken.
    pub fn notify(&self, n: usize) -> usize {
        let mut waiters = self.inner.waiters.lock();
        let mut woken = 0;
        while woken < n {
            match waiters.pop_live() {
                Some(waiter) => {
                    if waiter.set_result(true).is_ok() {
                        woken += 1;
                    }
                }
                None => break,
            }
        }
        trace!(requested = n, woken, "Condition notified");
        woken
    }

    /// Wake every live waiter
    pub fn notify_all(&self) -> usize {
        let n = self.inner.waiters.lock().len();
        self.notify(n)
    }

    /// Entries in the waiter list, including not-yet-compacted timeouts
    pub fn waiters(&self) -> usize {
        self.inner.waiters.lock().len()
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let waiters = self.waiters();
        if waiters > 0 {
            write!(f, "<Condition waiters[{}]>", waiters)
        } else {
            write!(f, "<Condition>")
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("waiters", &self.waiters())
            .finish()
    }
}

/// Future returned by [`Condition::wait`]
#[must_use = "dropping the future abandons the wait"]
pub struct Notified {
    waiter: Deferred<bool>,
    condition: Weak<ConditionInner>,
}

impl Future for Notified {
    type Output = SyncResult<bool>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.waiter.poll_take(cx)
    }
}

impl Drop for Notified {
    fn drop(&mut self) {
        if self.waiter.cancel() {
            if let Some(inner) = self.condition.upgrade() {
                inner.waiters.lock().collect_garbage();
            }
        }
    }
}
