/*!
 * FIFO Storage
 * First-in-first-out ordering
 */

use super::storage::QueueStorage;
use std::collections::VecDeque;

/// Insert at the tail, extract from the head
#[derive(Debug)]
pub struct Fifo<T> {
    items: VecDeque<T>,
}

impl<T> Default for Fifo<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T> QueueStorage<T> for Fifo<T> {
    #[inline]
    fn insert(&mut self, item: T) {
        self.items.push_back(item);
    }

    #[inline]
    fn extract(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    #[inline]
    fn reinsert(&mut self, item: T) {
        self.items.push_front(item);
    }

    #[inline]
    fn len(&self) -> usize {
        self.items.len()
    }
}
