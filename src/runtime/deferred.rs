/*!
 * Deferred Result
 *
 * Single-assignment value that will exist later. Every blocking operation
 * parks on one of these: the first party to settle it (the matching
 * notify/release/put/get, a timeout, or a dropped future) wins, and every
 * later attempt is told so instead of overwriting the outcome.
 *
 * # Design
 *
 * The cell lives behind an `Arc<Mutex<_>>` so the primitive's waiter list and
 * the caller's future can each hold a handle. Wakers and completion callbacks
 * are drained under the cell lock but fired after it is released, so a
 * callback may freely touch the same cell again.
 */

use crate::core::{SyncError, SyncResult};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

type Callback = Box<dyn FnOnce() + Send + 'static>;

enum State<T> {
    Pending,
    Done(SyncResult<T>),
    Taken,
}

struct Slot<T> {
    state: State<T>,
    wakers: Vec<Waker>,
    callbacks: Vec<Callback>,
}

impl<T> Slot<T> {
    #[inline]
    fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending)
    }

    fn register(&mut self, waker: &Waker) {
        if !self.wakers.iter().any(|w| w.will_wake(waker)) {
            self.wakers.push(waker.clone());
        }
    }
}

/// Single-assignment deferred value shared between clones
pub struct Deferred<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Deferred<T> {
    /// Create an unresolved cell
    pub fn new() -> Self {
        Self::with_state(State::Pending)
    }

    /// Create a cell that already holds a value
    pub fn resolved(value: T) -> Self {
        Self::with_state(State::Done(Ok(value)))
    }

    /// Create a cell that already holds a failure
    pub fn failed(err: SyncError) -> Self {
        Self::with_state(State::Done(Err(err)))
    }

    fn with_state(state: State<T>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                state,
                wakers: Vec::new(),
                callbacks: Vec::new(),
            })),
        }
    }

    /// Whether the cell has been settled (value, failure, or already taken)
    #[inline]
    pub fn is_done(&self) -> bool {
        !self.slot.lock().is_pending()
    }

    /// Resolve with a value
    ///
    /// Returns the value back if the cell was already settled.
    pub fn set_result(&self, value: T) -> Result<(), T> {
        let mut slot = self.slot.lock();
        if !slot.is_pending() {
            return Err(value);
        }
        slot.state = State::Done(Ok(value));
        Self::fire(slot);
        Ok(())
    }

    /// Resolve with a failure
    ///
    /// Returns `false` if the cell was already settled.
    pub fn set_error(&self, err: SyncError) -> bool {
        let mut slot = self.slot.lock();
        if !slot.is_pending() {
            return false;
        }
        slot.state = State::Done(Err(err));
        Self::fire(slot);
        true
    }

    /// Tombstone a pending cell whose observer went away
    #[inline]
    pub fn cancel(&self) -> bool {
        self.set_error(SyncError::Cancelled)
    }

    fn fire(mut slot: MutexGuard<'_, Slot<T>>) {
        let wakers = std::mem::take(&mut slot.wakers);
        let callbacks = std::mem::take(&mut slot.callbacks);
        drop(slot);

        for waker in wakers {
            waker.wake();
        }
        for callback in callbacks {
            callback();
        }
    }

    /// Run `callback` once the cell is settled (immediately if it already is)
    pub fn on_done<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.slot.lock();
        if slot.is_pending() {
            slot.callbacks.push(Box::new(callback));
        } else {
            drop(slot);
            callback();
        }
    }

    /// Wait for settlement without consuming the value
    pub fn poll_done(&self, cx: &mut Context<'_>) -> Poll<()> {
        let mut slot = self.slot.lock();
        if slot.is_pending() {
            slot.register(cx.waker());
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }

    /// Wait for settlement and move the outcome out of the cell
    pub fn poll_take(&self, cx: &mut Context<'_>) -> Poll<SyncResult<T>> {
        let mut slot = self.slot.lock();
        match std::mem::replace(&mut slot.state, State::Taken) {
            State::Pending => {
                slot.state = State::Pending;
                slot.register(cx.waker());
                Poll::Pending
            }
            State::Done(result) => Poll::Ready(result),
            State::Taken => Poll::Ready(Err(SyncError::Consumed)),
        }
    }

    /// Take the outcome if the cell is settled, without registering interest
    pub fn try_take(&self) -> Option<SyncResult<T>> {
        let mut slot = self.slot.lock();
        match std::mem::replace(&mut slot.state, State::Taken) {
            State::Pending => {
                slot.state = State::Pending;
                None
            }
            State::Done(result) => Some(result),
            State::Taken => Some(Err(SyncError::Consumed)),
        }
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.slot.lock().state {
            State::Pending => "pending",
            State::Done(Ok(_)) => "resolved",
            State::Done(Err(_)) => "failed",
            State::Taken => "taken",
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}

impl<T> Future for Deferred<T> {
    type Output = SyncResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.poll_take(cx)
    }
}
