/*!
 * Queue Types
 * Snapshot types for queue introspection
 */

use serde::{Deserialize, Serialize};

/// Point-in-time view of a queue
///
/// Waiter counts include timed-out entries not yet purged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Capacity (0 = unbounded)
    pub maxsize: usize,
    /// Items in storage
    pub qsize: usize,
    pub getters: usize,
    pub putters: usize,
    /// Items put but not yet marked done
    pub unfinished_tasks: usize,
}

impl QueueStats {
    #[inline]
    pub fn is_full(&self) -> bool {
        self.maxsize > 0 && self.qsize >= self.maxsize
    }
}
