/*!
 * Queue Storage
 *
 * The ordering strategy is the only axis of variation between queue
 * variants. Backpressure, timeouts and task tracking live in the queue core
 * and are shared by every storage.
 */

/// Item storage with a fixed extraction order
///
/// Implement this to plug a custom ordering into [`Queue`](super::Queue).
pub trait QueueStorage<T>: Default {
    /// Name shown in diagnostics
    const KIND: &'static str = "Queue";

    /// Store an item
    fn insert(&mut self, item: T);

    /// Remove the next item according to this storage's ordering
    fn extract(&mut self) -> Option<T>;

    /// Put back an item that was extracted but never delivered
    ///
    /// The item must come out next again, as if it had never been
    /// extracted. The default suits orderings where `insert` already
    /// places it there.
    #[inline]
    fn reinsert(&mut self, item: T) {
        self.insert(item);
    }

    /// Items currently stored
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
