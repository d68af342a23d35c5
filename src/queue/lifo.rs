/*!
 * LIFO Storage
 * Stack ordering: the most recent item is served first
 */

use super::storage::QueueStorage;

#[derive(Debug)]
pub struct Lifo<T> {
    stack: Vec<T>,
}

impl<T> Default for Lifo<T> {
    fn default() -> Self {
        Self { stack: Vec::new() }
    }
}

impl<T> QueueStorage<T> for Lifo<T> {
    const KIND: &'static str = "LifoQueue";

    #[inline]
    fn insert(&mut self, item: T) {
        self.stack.push(item);
    }

    #[inline]
    fn extract(&mut self) -> Option<T> {
        self.stack.pop()
    }

    #[inline]
    fn len(&self) -> usize {
        self.stack.len()
    }
}
