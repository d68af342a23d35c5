/*!
 * Synchronization Configuration
 *
 * Runtime configuration shared by every primitive: which timer fires
 * timeouts and how often stale waiters are compacted.
 */

use super::limits::WAITER_GC_INTERVAL;
use crate::runtime::{Timer, TokioTimer};
use std::sync::Arc;

/// Synchronization configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Timeout firings between waiter-list compactions
    pub gc_interval: usize,
    /// Timer service used to schedule timeouts
    pub timer: Arc<dyn Timer>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            gc_interval: WAITER_GC_INTERVAL,
            timer: Arc::new(TokioTimer::new()),
        }
    }
}

impl SyncConfig {
    /// Configuration driven by an explicit timer (e.g. a `ManualTimer`)
    pub fn with_timer(timer: Arc<dyn Timer>) -> Self {
        Self {
            gc_interval: WAITER_GC_INTERVAL,
            timer,
        }
    }

    /// Override the compaction interval (clamped to at least 1)
    pub fn gc_interval(mut self, interval: usize) -> Self {
        self.gc_interval = interval.max(1);
        self
    }
}
