/*!
 * Synchronization Primitives
 *
 * Cooperative wait/notify primitives for tasks sharing one scheduler:
 * - `Condition` for park-until-notified
 * - `Event` for a resettable broadcast flag
 * - `Semaphore` / `BoundedSemaphore` for counting permits
 * - `Lock` for mutual exclusion
 *
 * # Architecture
 *
 * Every blocking call parks a `Deferred` in a FIFO waiter list and returns a
 * future over it. Timeouts and dropped futures tombstone the entry in place;
 * the list skips tombstones when serving and compacts them periodically.
 */

mod condition;
mod event;
mod lock;
mod semaphore;
mod waiters;

pub use condition::{Condition, Notified};
pub use event::{Event, EventWait};
pub use lock::{Lock, LockAcquire, LockGuard};
pub use semaphore::{Acquire, BoundedSemaphore, Semaphore, SemaphoreGuard};
