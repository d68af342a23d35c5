/*!
 * Timeout Wrapper
 *
 * Wraps a future so it fails with `SyncError::Timeout` if its deadline passes
 * first. The deadline is armed when the wrapper is built, not on first poll,
 * matching how every other blocking operation in the crate starts its clock.
 */

use super::deferred::Deferred;
use super::timer::{Timer, TimerHandle};
use crate::core::{SyncError, SyncResult, Timeout};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

struct Expiry {
    expired: Deferred<()>,
    handle: Option<TimerHandle>,
    timer: Arc<dyn Timer>,
}

impl Expiry {
    fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.timer.cancel(handle);
        }
    }
}

/// Future that races `inner` against a deadline
#[must_use = "futures do nothing unless polled"]
pub struct WithTimeout<F> {
    inner: F,
    expiry: Option<Expiry>,
}

impl<F> WithTimeout<F>
where
    F: Future + Unpin,
{
    /// Wrap `inner`; `None` means no deadline
    pub fn new(inner: F, timer: &Arc<dyn Timer>, timeout: Option<Timeout>) -> Self {
        let expiry = timeout.and_then(|timeout| timeout.deadline(timer.now())).map(|deadline| {
            let expired = Deferred::new();
            let flag = expired.clone();
            let handle = match timer.call_at(deadline, Box::new(move || {
                let _ = flag.set_result(());
            })) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    expired.set_error(err);
                    None
                }
            };
            Expiry {
                expired,
                handle,
                timer: Arc::clone(timer),
            }
        });
        Self { inner, expiry }
    }
}

impl<F> Future for WithTimeout<F>
where
    F: Future + Unpin,
{
    type Output = SyncResult<F::Output>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;

        if let Poll::Ready(output) = Pin::new(&mut this.inner).poll(cx) {
            if let Some(expiry) = this.expiry.as_mut() {
                expiry.disarm();
            }
            return Poll::Ready(Ok(output));
        }

        if let Some(expiry) = this.expiry.as_mut() {
            if expiry.expired.poll_done(cx).is_ready() {
                expiry.disarm();
                // A timer that could not be armed surfaces its own error
                let err = match expiry.expired.try_take() {
                    Some(Err(err)) => err,
                    _ => SyncError::Timeout,
                };
                return Poll::Ready(Err(err));
            }
        }
        Poll::Pending
    }
}

impl<F> Drop for WithTimeout<F> {
    fn drop(&mut self) {
        if let Some(expiry) = self.expiry.as_mut() {
            expiry.disarm();
        }
    }
}
