/*!
 * Lock
 *
 * Mutual exclusion built on a bounded semaphore of one permit. Only the
 * release contract differs: releasing a lock nobody holds is reported as
 * `ReleaseUnlocked` instead of a counting error.
 */

use super::semaphore::{Acquire, BoundedSemaphore, SemaphoreGuard};
use crate::core::limits::LOCK_PERMITS;
use crate::core::{SyncConfig, SyncError, SyncResult, Timeout};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

fn unlocked(err: SyncError) -> SyncError {
    match err {
        SyncError::ReleasedTooManyTimes => SyncError::ReleaseUnlocked,
        other => other,
    }
}

/// Cooperative mutual-exclusion lock
///
/// # Examples
///
/// ```no_run
/// use coop_sync::Lock;
///
/// # async fn demo() -> coop_sync::SyncResult<()> {
/// let lock = Lock::new();
/// let guard = lock.acquire(None).await?;
/// // ... critical section ...
/// guard.release()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Lock {
    sem: BoundedSemaphore,
}

impl Lock {
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        Self {
            sem: BoundedSemaphore::with_config(LOCK_PERMITS, config),
        }
    }

    /// Acquire the lock, parking behind earlier acquirers
    pub fn acquire(&self, timeout: Option<Timeout>) -> LockAcquire {
        LockAcquire {
            inner: self.sem.acquire(timeout),
        }
    }

    /// Release without a guard
    ///
    /// For callers that `forget` their guard and track ownership themselves.
    /// Fails with `ReleaseUnlocked` when the lock is not held.
    pub fn release(&self) -> SyncResult<()> {
        self.sem.release().map_err(unlocked)
    }

    /// Whether the lock is currently held
    pub fn locked(&self) -> bool {
        self.sem.value() == 0
    }

    pub fn waiters(&self) -> usize {
        self.sem.waiters()
    }
}

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.locked() { "locked" } else { "unlocked" };
        let waiters = self.waiters();
        if waiters > 0 {
            write!(f, "<Lock [{},waiters:{}]>", state, waiters)
        } else {
            write!(f, "<Lock [{}]>", state)
        }
    }
}

impl fmt::Debug for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock")
            .field("locked", &self.locked())
            .field("waiters", &self.waiters())
            .finish()
    }
}

/// Future returned by [`Lock::acquire`]
#[must_use = "dropping the future abandons the acquire"]
pub struct LockAcquire {
    inner: Acquire,
}

impl Future for LockAcquire {
    type Output = SyncResult<LockGuard>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner)
            .poll(cx)
            .map(|result| result.map(|inner| LockGuard { inner }))
    }
}

/// Held lock; unlocks on drop or explicit `release`
#[must_use = "dropping the guard unlocks immediately"]
#[derive(Debug)]
pub struct LockGuard {
    inner: SemaphoreGuard,
}

impl LockGuard {
    pub fn release(self) -> SyncResult<()> {
        self.inner.release().map_err(unlocked)
    }

    /// Keep the lock held past this guard; pair with [`Lock::release`]
    pub fn forget(self) {
        self.inner.defuse();
    }
}
