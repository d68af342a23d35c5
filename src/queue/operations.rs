/*!
 * Queue Operations
 *
 * Futures returned by the blocking queue calls. Dropping one before it
 * completes abandons the wait: the parked entry is tombstoned, and an item
 * already handed to an abandoned getter goes back to the position it was
 * extracted from.
 */

use super::core::QueueInner;
use super::storage::QueueStorage;
use crate::core::SyncResult;
use crate::runtime::Deferred;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

/// Future returned by [`Queue::put`](super::Queue::put)
#[must_use = "dropping the future abandons the put"]
pub struct Put<T, S: QueueStorage<T>> {
    waiter: Deferred<()>,
    queue: Weak<QueueInner<T, S>>,
}

impl<T, S: QueueStorage<T>> Put<T, S> {
    pub(super) fn new(waiter: Deferred<()>, queue: &Arc<QueueInner<T, S>>) -> Self {
        Self {
            waiter,
            queue: Arc::downgrade(queue),
        }
    }
}

impl<T, S: QueueStorage<T>> Future for Put<T, S> {
    type Output = SyncResult<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.waiter.poll_take(cx)
    }
}

impl<T, S: QueueStorage<T>> Drop for Put<T, S> {
    fn drop(&mut self) {
        if self.waiter.is_done() {
            return;
        }
        match self.queue.upgrade() {
            Some(queue) => queue.abandon_putter(&self.waiter),
            None => {
                self.waiter.cancel();
            }
        }
    }
}

/// Future returned by [`Queue::get`](super::Queue::get)
#[must_use = "dropping the future abandons the get"]
pub struct Get<T, S: QueueStorage<T>> {
    waiter: Deferred<T>,
    queue: Weak<QueueInner<T, S>>,
}

impl<T, S: QueueStorage<T>> Get<T, S> {
    pub(super) fn new(waiter: Deferred<T>, queue: &Arc<QueueInner<T, S>>) -> Self {
        Self {
            waiter,
            queue: Arc::downgrade(queue),
        }
    }
}

impl<T, S: QueueStorage<T>> Future for Get<T, S> {
    type Output = SyncResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.waiter.poll_take(cx)
    }
}

impl<T, S: QueueStorage<T>> Drop for Get<T, S> {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.upgrade() {
            queue.abandon_getter(&self.waiter);
        }
    }
}
