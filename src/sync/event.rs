/*!
 * Event
 *
 * Boolean gate represented entirely by the completion state of one deferred
 * cell. `set` resolves the cell; `clear` swaps in a fresh one only if the
 * current cell is resolved, so tasks parked on an unresolved gate are never
 * stranded.
 */

use crate::core::{SyncConfig, SyncResult, Timeout};
use crate::runtime::{Deferred, Timer, WithTimeout};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::debug;

struct EventInner {
    gate: Mutex<Deferred<()>>,
    timer: Arc<dyn Timer>,
}

/// Event that blocks waiters until its flag is set
#[derive(Clone)]
pub struct Event {
    inner: Arc<EventInner>,
}

impl Event {
    /// Create a cleared event with default configuration
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        Self {
            inner: Arc::new(EventInner {
                gate: Mutex::new(Deferred::new()),
                timer: config.timer,
            }),
        }
    }

    /// Whether the flag is set
    #[inline]
    pub fn is_set(&self) -> bool {
        self.inner.gate.lock().is_done()
    }

    /// Set the flag, waking every waiter. No-op if already set.
    pub fn set(&self) {
        let gate = self.inner.gate.lock();
        if gate.set_result(()).is_ok() {
            debug!("Event set");
        }
    }

    /// Reset the flag. No-op if already clear.
    pub fn clear(&self) {
        let mut gate = self.inner.gate.lock();
        if gate.is_done() {
            *gate = Deferred::new();
            debug!("Event cleared");
        }
    }

    /// Wait until the flag is set
    ///
    /// With a timeout, fails with `SyncError::Timeout` if the flag is not set
    /// by the deadline.
    pub fn wait(&self, timeout: Option<Timeout>) -> EventWait {
        let gate = self.inner.gate.lock().clone();
        EventWait {
            wait: WithTimeout::new(GateWait { gate }, &self.inner.timer, timeout),
        }
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_set() { "set" } else { "clear" };
        write!(f, "<Event {}>", state)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event").field("set", &self.is_set()).finish()
    }
}

/// Observes a gate cell without consuming it
struct GateWait {
    gate: Deferred<()>,
}

impl Future for GateWait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.gate.poll_done(cx)
    }
}

/// Future returned by [`Event::wait`]
#[must_use = "futures do nothing unless polled"]
pub struct EventWait {
    wait: WithTimeout<GateWait>,
}

impl Future for EventWait {
    type Output = SyncResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.wait).poll(cx)
    }
}
