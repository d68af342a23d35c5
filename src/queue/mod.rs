/*!
 * Queue Module
 * Producer/consumer queues with backpressure and completion tracking
 */

mod core;
mod fifo;
mod lifo;
mod operations;
mod priority;
mod storage;
mod stream;
mod types;

pub use self::core::Queue;
pub use fifo::Fifo;
pub use lifo::Lifo;
pub use operations::{Get, Put};
pub use priority::Priority;
pub use storage::QueueStorage;
pub use types::QueueStats;

/// Last-in-first-out queue
pub type LifoQueue<T> = Queue<T, Lifo<T>>;

/// Queue serving the lowest item first
pub type PriorityQueue<T> = Queue<T, Priority<T>>;
