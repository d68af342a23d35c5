/*!
 * Coop Sync Library
 * Cooperative synchronization primitives for async tasks
 *
 * - `Lock`, `Semaphore`, `BoundedSemaphore` for exclusion and permits
 * - `Condition`, `Event` for signalling
 * - `Queue`, `LifoQueue`, `PriorityQueue` for producer/consumer hand-off
 *
 * Every blocking call takes an optional [`Timeout`] and returns a future;
 * timeouts are driven by a pluggable [`Timer`] (tokio by default, or a
 * [`ManualTimer`] for deterministic tests).
 */

pub mod core;
pub mod monitoring;
pub mod queue;
pub mod runtime;
pub mod sync;

// Re-exports
pub use crate::core::{QueueFull, SyncConfig, SyncError, SyncResult, Timeout};
pub use monitoring::init_tracing;
pub use queue::{LifoQueue, PriorityQueue, Queue, QueueStats, QueueStorage};
pub use runtime::{Deferred, ManualTimer, Timer, TimerHandle, TokioTimer, WithTimeout};
pub use sync::{BoundedSemaphore, Condition, Event, Lock, LockGuard, Semaphore, SemaphoreGuard};
