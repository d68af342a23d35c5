/*!
 * Tokio Timer
 *
 * Default timer backed by the current tokio runtime. Each scheduled callback
 * is a task sleeping until its deadline; cancelling aborts the task.
 */

use super::timer::{Timer, TimerCallback, TimerHandle};
use crate::core::SyncError;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::task::AbortHandle;

/// Timer that schedules callbacks as tokio tasks
///
/// The runtime is looked up on every `call_at`, so a `TokioTimer` can be
/// created before any runtime exists.
#[derive(Debug, Default)]
pub struct TokioTimer {
    next_id: AtomicU64,
    tasks: DashMap<u64, AbortHandle>,
}

impl TokioTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked callbacks whose handle has not been cancelled
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

impl Timer for TokioTimer {
    fn now(&self) -> Instant {
        // Follow tokio's clock so paused-time tests stay consistent
        tokio::time::Instant::now().into_std()
    }

    fn call_at(&self, deadline: Instant, callback: TimerCallback) -> Result<TimerHandle, SyncError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SyncError::TimerUnavailable(e.to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let deadline = tokio::time::Instant::from_std(deadline);
        let task = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            callback();
        });

        // Entries outlive firing until the owner cancels its handle
        if !task.is_finished() {
            self.tasks.insert(id, task.abort_handle());
        }
        tracing::trace!(timer_id = id, "Timer armed");
        Ok(TimerHandle(id))
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some((_, task)) = self.tasks.remove(&handle.0) {
            task.abort();
            tracing::trace!(timer_id = handle.0, "Timer cancelled");
        }
    }

    fn name(&self) -> &'static str {
        "tokio"
    }
}
