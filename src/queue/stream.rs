/*!
 * Queue Streaming
 * Consume a queue as an async stream of items
 */

use super::core::Queue;
use super::storage::QueueStorage;
use tracing::debug;

impl<T, S> Queue<T, S>
where
    T: Send + 'static,
    S: QueueStorage<T> + Send + 'static,
{
    /// Yield items as they arrive
    ///
    /// The stream never ends on its own; stop polling it to stop consuming.
    /// Items still need `task_done` for `join` to complete.
    pub fn stream(&self) -> impl futures::Stream<Item = T> {
        let queue = self.clone();
        async_stream::stream! {
            loop {
                match queue.get(None).await {
                    Ok(item) => yield item,
                    Err(err) => {
                        debug!(error = %err, "Queue stream stopped");
                        break;
                    }
                }
            }
        }
    }
}
