/*!
 * Priority Storage
 *
 * Binary min-heap keyed by the item's natural ordering. Callers conventionally
 * store `(priority, payload)` tuples; the lowest key is extracted first.
 */

use super::storage::QueueStorage;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Ascending-key extraction order
#[derive(Debug)]
pub struct Priority<T> {
    heap: BinaryHeap<Reverse<T>>,
}

impl<T: Ord> Default for Priority<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }
}

impl<T: Ord> QueueStorage<T> for Priority<T> {
    const KIND: &'static str = "PriorityQueue";

    #[inline]
    fn insert(&mut self, item: T) {
        self.heap.push(Reverse(item));
    }

    #[inline]
    fn extract(&mut self) -> Option<T> {
        self.heap.pop().map(|Reverse(item)| item)
    }

    #[inline]
    fn len(&self) -> usize {
        self.heap.len()
    }
}
