/*!
 * Semaphore
 *
 * Counting permits with FIFO-fair handoff. A release that finds a live waiter
 * hands its permit straight to that waiter inside the same critical section,
 * so no later caller can slip in and take it.
 *
 * # Variants
 *
 * - `Semaphore`: unbounded releases
 * - `BoundedSemaphore`: a release that would push the count past its initial
 *   value fails with `ReleasedTooManyTimes`
 *
 * Both hand out a `SemaphoreGuard`; dropping it (or calling `release` on it)
 * returns the permit exactly once.
 */

use super::waiters::WaiterList;
use crate::core::limits::DEFAULT_SEMAPHORE_PERMITS;
use crate::core::{SyncConfig, SyncError, SyncResult, Timeout};
use crate::runtime::{arm_timeout, Deferred, Timer};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tracing::{debug, error, trace, warn};

struct SemaphoreState {
    /// Free permits
    value: usize,
    waiters: WaiterList<SemaphoreGuard>,
}

/// State shared by both semaphore flavours and their guards
pub(crate) struct SemaphoreCore {
    state: Mutex<SemaphoreState>,
    /// Initial value, for bounded semaphores
    bound: Option<usize>,
    timer: Arc<dyn Timer>,
}

impl SemaphoreCore {
    fn new(value: usize, bound: Option<usize>, config: SyncConfig) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SemaphoreState {
                value,
                waiters: WaiterList::new(config.gc_interval),
            }),
            bound,
            timer: config.timer,
        })
    }

    fn acquire(self: &Arc<Self>, timeout: Option<Timeout>) -> Acquire {
        let waiter = {
            let mut state = self.state.lock();
            if state.value > 0 {
                state.value -= 1;
                trace!(remaining = state.value, "Permit acquired");
                drop(state);
                return Acquire {
                    waiter: Deferred::resolved(SemaphoreGuard::new(Arc::clone(self))),
                    core: Arc::downgrade(self),
                };
            }
            let waiter = Deferred::new();
            state.waiters.push(waiter.clone());
            trace!(waiters = state.waiters.len(), "Acquirer parked");
            waiter
        };

        if let Some(timeout) = timeout {
            let weak = Arc::downgrade(self);
            let target = waiter.clone();
            arm_timeout(&self.timer, &waiter, timeout, move || match weak.upgrade() {
                Some(core) => core.expire(&target),
                None => {
                    target.set_error(SyncError::Timeout);
                }
            });
        }

        Acquire {
            waiter,
            core: Arc::downgrade(self),
        }
    }

    fn expire(&self, target: &Deferred<SemaphoreGuard>) {
        let mut state = self.state.lock();
        if target.set_error(SyncError::Timeout) {
            debug!("Semaphore acquire timed out");
            state.waiters.collect_garbage();
        }
    }

    /// Return one permit, handing it to the oldest live waiter if any
    fn release(self: &Arc<Self>) -> SyncResult<()> {
        let handed = {
            let mut state = self.state.lock();
            if let Some(bound) = self.bound {
                if state.value >= bound {
                    warn!(value = state.value, bound, "Semaphore released too many times");
                    return Err(SyncError::ReleasedTooManyTimes);
                }
            }
            state.value += 1;
            self.hand_off(&mut state)
        };
        // The resolved cell may own the only other handle to the guard;
        // release it outside the lock.
        drop(handed);
        Ok(())
    }

    /// Return one permit without the bound check
    fn release_unbounded(self: &Arc<Self>) {
        let handed = {
            let mut state = self.state.lock();
            state.value += 1;
            self.hand_off(&mut state)
        };
        drop(handed);
    }

    fn hand_off(self: &Arc<Self>, state: &mut SemaphoreState) -> Option<Deferred<SemaphoreGuard>> {
        while let Some(waiter) = state.waiters.pop_live() {
            state.value -= 1;
            match waiter.set_result(SemaphoreGuard::new(Arc::clone(self))) {
                Ok(()) => {
                    trace!("Permit handed to waiter");
                    return Some(waiter);
                }
                Err(guard) => {
                    // Lost the race with a timeout or cancel
                    guard.defuse();
                    state.value += 1;
                }
            }
        }
        None
    }

    fn forget_waiter(&self) {
        self.state.lock().waiters.collect_garbage();
    }

    fn value(&self) -> usize {
        self.state.lock().value
    }

    fn waiters(&self) -> usize {
        self.state.lock().waiters.len()
    }

    fn describe(&self, name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, waiters) = {
            let state = self.state.lock();
            (state.value, state.waiters.len())
        };
        write!(f, "<{} [", name)?;
        if value == 0 {
            write!(f, "locked")?;
        } else {
            write!(f, "unlocked,value:{}", value)?;
        }
        if waiters > 0 {
            write!(f, ",waiters:{}", waiters)?;
        }
        write!(f, "]>")
    }
}

/// Scoped permit; releases exactly once on drop or explicit `release`
#[must_use = "dropping the guard releases the permit immediately"]
pub struct SemaphoreGuard {
    core: Option<Arc<SemaphoreCore>>,
}

impl SemaphoreGuard {
    fn new(core: Arc<SemaphoreCore>) -> Self {
        Self { core: Some(core) }
    }

    /// Forget the permit without returning it (the caller already accounted for it)
    pub(crate) fn defuse(mut self) {
        self.core = None;
    }

    /// Release the permit now
    pub fn release(mut self) -> SyncResult<()> {
        match self.core.take() {
            Some(core) => core.release(),
            None => Ok(()),
        }
    }
}

impl Drop for SemaphoreGuard {
    fn drop(&mut self) {
        if let Some(core) = self.core.take() {
            if let Err(err) = core.release() {
                error!(error = %err, "Permit release on drop failed");
            }
        }
    }
}

impl fmt::Debug for SemaphoreGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemaphoreGuard")
            .field("held", &self.core.is_some())
            .finish()
    }
}

/// Future returned by `acquire`
///
/// Dropping it before completion abandons the wait; a permit that was
/// already handed over is returned.
#[must_use = "dropping the future abandons the acquire"]
pub struct Acquire {
    waiter: Deferred<SemaphoreGuard>,
    core: Weak<SemaphoreCore>,
}

impl Future for Acquire {
    type Output = SyncResult<SemaphoreGuard>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.waiter.poll_take(cx)
    }
}

impl Drop for Acquire {
    fn drop(&mut self) {
        if self.waiter.cancel() {
            if let Some(core) = self.core.upgrade() {
                core.forget_waiter();
            }
        }
    }
}

fn initial_value(value: i64) -> SyncResult<usize> {
    usize::try_from(value).map_err(|_| {
        SyncError::InvalidValue(format!("semaphore initial value must be >= 0, got {}", value))
    })
}

/// Counting semaphore
///
/// # Examples
///
/// ```no_run
/// use coop_sync::Semaphore;
///
/// # async fn demo() -> coop_sync::SyncResult<()> {
/// let sem = Semaphore::new(2);
/// let permit = sem.acquire(None).await?;
/// // ... use the shared resource ...
/// drop(permit);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Semaphore {
    core: Arc<SemaphoreCore>,
}

impl Semaphore {
    pub fn new(value: usize) -> Self {
        Self::with_config(value, SyncConfig::default())
    }

    pub fn with_config(value: usize, config: SyncConfig) -> Self {
        Self {
            core: SemaphoreCore::new(value, None, config),
        }
    }

    /// Take a permit, parking in FIFO order if none is free
    pub fn acquire(&self, timeout: Option<Timeout>) -> Acquire {
        self.core.acquire(timeout)
    }

    /// Return a permit
    pub fn release(&self) {
        self.core.release_unbounded();
    }

    /// Free permits
    pub fn value(&self) -> usize {
        self.core.value()
    }

    /// Entries in the waiter list, including not-yet-compacted timeouts
    pub fn waiters(&self) -> usize {
        self.core.waiters()
    }
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::new(DEFAULT_SEMAPHORE_PERMITS)
    }
}

impl TryFrom<i64> for Semaphore {
    type Error = SyncError;

    fn try_from(value: i64) -> SyncResult<Self> {
        Ok(Self::new(initial_value(value)?))
    }
}

impl fmt::Display for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.core.describe("Semaphore", f)
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Semaphore")
            .field("value", &self.value())
            .field("waiters", &self.waiters())
            .finish()
    }
}

/// Semaphore that refuses to be released past its initial value
#[derive(Clone)]
pub struct BoundedSemaphore {
    core: Arc<SemaphoreCore>,
    initial: usize,
}

impl BoundedSemaphore {
    pub fn new(value: usize) -> Self {
        Self::with_config(value, SyncConfig::default())
    }

    pub fn with_config(value: usize, config: SyncConfig) -> Self {
        Self {
            core: SemaphoreCore::new(value, Some(value), config),
            initial: value,
        }
    }

    /// Take a permit, parking in FIFO order if none is free
    pub fn acquire(&self, timeout: Option<Timeout>) -> Acquire {
        self.core.acquire(timeout)
    }

    /// Return a permit; fails if every permit is already free
    pub fn release(&self) -> SyncResult<()> {
        self.core.release()
    }

    /// Free permits
    pub fn value(&self) -> usize {
        self.core.value()
    }

    /// Initial (and maximum) permit count
    pub fn initial(&self) -> usize {
        self.initial
    }

    pub fn waiters(&self) -> usize {
        self.core.waiters()
    }
}

impl Default for BoundedSemaphore {
    fn default() -> Self {
        Self::new(DEFAULT_SEMAPHORE_PERMITS)
    }
}

impl TryFrom<i64> for BoundedSemaphore {
    type Error = SyncError;

    fn try_from(value: i64) -> SyncResult<Self> {
        Ok(Self::new(initial_value(value)?))
    }
}

impl fmt::Display for BoundedSemaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.core.describe("BoundedSemaphore", f)
    }
}

impl fmt::Debug for BoundedSemaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedSemaphore")
            .field("value", &self.value())
            .field("initial", &self.initial)
            .field("waiters", &self.waiters())
            .finish()
    }
}
