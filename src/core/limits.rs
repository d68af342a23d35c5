/*!
 * Limits and Constants
 *
 * Centralized location for thresholds shared by the synchronization primitives.
 */

// =============================================================================
// WAITER LISTS
// =============================================================================

/// Timeout firings between waiter-list compactions
/// [PERF] Amortizes the O(n) rebuild across many timeouts
pub const WAITER_GC_INTERVAL: usize = 100;

/// Initial capacity reserved for waiter lists
pub const INITIAL_WAITER_CAPACITY: usize = 4;

// =============================================================================
// QUEUES
// =============================================================================

/// Maxsize value meaning "no capacity bound"
pub const UNBOUNDED_QUEUE: usize = 0;

// =============================================================================
// LOCKS
// =============================================================================

/// Permit count backing a lock
pub const LOCK_PERMITS: usize = 1;

/// Default permit count for a semaphore built without an explicit value
pub const DEFAULT_SEMAPHORE_PERMITS: usize = 1;
