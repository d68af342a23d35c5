/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Synchronization errors with serialization support
///
/// Blocking operations deliver these through the waiter's failure channel;
/// non-blocking variants return them synchronously.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SyncError {
    #[error("Operation timed out")]
    #[diagnostic(
        code(sync::timeout),
        help("The deadline passed before the waiter was satisfied. Retry or extend the timeout.")
    )]
    Timeout,

    #[error("Queue is full")]
    #[diagnostic(
        code(sync::queue_full),
        help("No free slot was available. Use the blocking put to wait for capacity.")
    )]
    QueueFull,

    #[error("Queue is empty")]
    #[diagnostic(
        code(sync::queue_empty),
        help("No item was available. Use the blocking get to wait for a producer.")
    )]
    QueueEmpty,

    #[error("Semaphore released too many times")]
    #[diagnostic(
        code(sync::released_too_many_times),
        help("Every release must be paired with a successful acquire.")
    )]
    ReleasedTooManyTimes,

    #[error("Release of an unlocked lock")]
    #[diagnostic(
        code(sync::release_unlocked),
        help("Only the current holder may release a lock.")
    )]
    ReleaseUnlocked,

    #[error("task_done() called too many times")]
    #[diagnostic(
        code(sync::task_done_too_many_times),
        help("Call task_done once per item taken from the queue.")
    )]
    TaskDoneTooManyTimes,

    #[error("Invalid value: {0}")]
    #[diagnostic(code(sync::invalid_value))]
    InvalidValue(String),

    #[error("Wait was cancelled")]
    #[diagnostic(code(sync::cancelled))]
    Cancelled,

    #[error("Deferred value already consumed")]
    #[diagnostic(
        code(sync::consumed),
        help("A waiter's value can be taken once. Observe completion instead of awaiting twice.")
    )]
    Consumed,

    #[error("Timer unavailable: {0}")]
    #[diagnostic(
        code(sync::timer_unavailable),
        help("Timeouts need a running tokio runtime or an explicitly configured timer.")
    )]
    TimerUnavailable(String),
}

impl SyncError {
    /// Whether the caller may reasonably retry the operation
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SyncError::Timeout | SyncError::QueueFull | SyncError::QueueEmpty | SyncError::Cancelled
        )
    }
}

/// Capacity signal from `put_nowait`, carrying the rejected item back
#[derive(Error, Clone, PartialEq, Eq)]
#[error("Queue is full")]
pub struct QueueFull<T>(pub T);

impl<T> QueueFull<T> {
    /// Recover the item that could not be stored
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::fmt::Debug for QueueFull<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("QueueFull(..)")
    }
}

impl<T> From<QueueFull<T>> for SyncError {
    fn from(_: QueueFull<T>) -> Self {
        SyncError::QueueFull
    }
}
