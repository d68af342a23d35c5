/*!
 * Queue Core
 *
 * Bounded producer/consumer queue with completion tracking. State is the
 * item storage crossed with two FIFO waiter lists: parked getters (storage
 * empty) and parked putters (storage full). `maxsize == 0` means unbounded.
 *
 * # Matching
 *
 * A put that finds a parked getter stores the item and then serves the
 * getter by extracting through the storage, never by handing the raw item
 * over. Under priority ordering the getter therefore receives the best item
 * available, which may not be the one just put.
 *
 * # Stale waiters
 *
 * Every operation first pops settled entries from the front of both waiter
 * lists. Queue waiters come from explicit put/get calls, so front purging
 * is enough to keep the lists bounded.
 *
 * # Abandoned gets
 *
 * A `Get` dropped after an item was handed to it puts the item back where
 * it came from (`QueueStorage::reinsert`). This is the one path that may
 * leave a bounded queue holding more than `maxsize` items.
 */

use super::fifo::Fifo;
use super::operations::{Get, Put};
use super::storage::QueueStorage;
use super::types::QueueStats;
use crate::core::limits::UNBOUNDED_QUEUE;
use crate::core::{QueueFull, SyncConfig, SyncError, SyncResult, Timeout};
use crate::runtime::{arm_timeout, Deferred, Timer};
use crate::sync::{Event, EventWait};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub(super) struct Putter<T> {
    item: T,
    waiter: Deferred<()>,
}

pub(super) struct QueueState<T, S> {
    storage: S,
    getters: VecDeque<Deferred<T>>,
    putters: VecDeque<Putter<T>>,
    unfinished_tasks: usize,
}

pub(super) struct QueueInner<T, S> {
    state: Mutex<QueueState<T, S>>,
    /// Set whenever `unfinished_tasks` is zero
    finished: Event,
    maxsize: usize,
    timer: Arc<dyn Timer>,
}

impl<T, S> QueueInner<T, S>
where
    S: QueueStorage<T>,
{
    fn purge(state: &mut QueueState<T, S>) {
        while state.getters.front().is_some_and(Deferred::is_done) {
            state.getters.pop_front();
        }
        while state.putters.front().is_some_and(|p| p.waiter.is_done()) {
            state.putters.pop_front();
        }
    }

    #[inline]
    fn is_full(&self, state: &QueueState<T, S>) -> bool {
        self.maxsize != UNBOUNDED_QUEUE && state.storage.len() >= self.maxsize
    }

    fn store(&self, state: &mut QueueState<T, S>, item: T) {
        state.storage.insert(item);
        state.unfinished_tasks += 1;
        self.finished.clear();
    }

    /// Extract items for parked getters, oldest getter first
    fn serve_getters(state: &mut QueueState<T, S>) {
        while !state.storage.is_empty() {
            let Some(getter) = state.getters.pop_front() else {
                break;
            };
            if getter.is_done() {
                continue;
            }
            let Some(item) = state.storage.extract() else {
                break;
            };
            if let Err(item) = getter.set_result(item) {
                state.storage.reinsert(item);
            } else {
                trace!("Getter served");
            }
        }
    }

    fn try_put(&self, state: &mut QueueState<T, S>, item: T) -> Result<(), QueueFull<T>> {
        Self::purge(state);
        if state.getters.is_empty() && self.is_full(state) {
            return Err(QueueFull(item));
        }
        self.store(state, item);
        Self::serve_getters(state);
        Ok(())
    }

    fn try_get(&self, state: &mut QueueState<T, S>) -> SyncResult<T> {
        Self::purge(state);
        if let Some(Putter { item, waiter }) = state.putters.pop_front() {
            // Storage is full here; admitting the putter first keeps the
            // extraction order identical to an unparked put.
            let _ = waiter.set_result(());
            self.store(state, item);
            trace!("Parked putter admitted");
        }
        state.storage.extract().ok_or(SyncError::QueueEmpty)
    }

    fn expire_getter(&self, target: &Deferred<T>) {
        let _state = self.state.lock();
        if target.set_error(SyncError::Timeout) {
            debug!("Queue get timed out");
        }
    }

    fn expire_putter(&self, target: &Deferred<()>) {
        let _state = self.state.lock();
        if target.set_error(SyncError::Timeout) {
            debug!("Queue put timed out");
        }
    }

    /// Tombstone a dropped getter; an item already handed to it goes back
    ///
    /// The item returns to the position it was extracted from. A bounded
    /// queue refilled in the meantime is left over capacity until consumers
    /// drain it, and puts stay refused until then.
    pub(super) fn abandon_getter(&self, waiter: &Deferred<T>) {
        let mut state = self.state.lock();
        if waiter.cancel() {
            return;
        }
        if let Some(Ok(item)) = waiter.try_take() {
            state.storage.reinsert(item);
            if self.maxsize != UNBOUNDED_QUEUE && state.storage.len() > self.maxsize {
                debug!(
                    qsize = state.storage.len(),
                    maxsize = self.maxsize,
                    "Returned item overfills queue"
                );
            } else {
                trace!("Returning item from abandoned getter");
            }
            Self::serve_getters(&mut state);
        }
    }

    pub(super) fn abandon_putter(&self, waiter: &Deferred<()>) {
        let _state = self.state.lock();
        waiter.cancel();
    }
}

/// Producer/consumer queue
///
/// `S` selects the ordering; see [`LifoQueue`](super::LifoQueue) and
/// [`PriorityQueue`](super::PriorityQueue).
///
/// # Examples
///
/// ```no_run
/// use coop_sync::Queue;
///
/// # async fn demo() -> coop_sync::SyncResult<()> {
/// let queue: Queue<u32> = Queue::new(8);
/// queue.put(1, None).await?;
/// let item = queue.get(None).await?;
/// queue.task_done()?;
/// queue.join(None).await?;
/// # Ok(())
/// # }
/// ```
pub struct Queue<T, S = Fifo<T>> {
    pub(super) inner: Arc<QueueInner<T, S>>,
}

impl<T, S> Clone for Queue<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, S> Queue<T, S>
where
    T: Send + 'static,
    S: QueueStorage<T> + Send + 'static,
{
    /// Create a queue holding at most `maxsize` items (0 = unbounded)
    pub fn new(maxsize: usize) -> Self {
        Self::with_config(maxsize, SyncConfig::default())
    }

    pub fn with_config(maxsize: usize, config: SyncConfig) -> Self {
        let finished = Event::with_config(config.clone());
        finished.set();
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    storage: S::default(),
                    getters: VecDeque::new(),
                    putters: VecDeque::new(),
                    unfinished_tasks: 0,
                }),
                finished,
                maxsize,
                timer: config.timer,
            }),
        }
    }

    /// Put without waiting
    ///
    /// Fails with [`QueueFull`], carrying the item back, when no capacity is
    /// free and no getter is parked.
    pub fn put_nowait(&self, item: T) -> Result<(), QueueFull<T>> {
        let mut state = self.inner.state.lock();
        self.inner.try_put(&mut state, item)
    }

    /// Put, parking behind earlier putters while the queue is full
    pub fn put(&self, item: T, timeout: Option<Timeout>) -> Put<T, S> {
        let waiter = {
            let mut state = self.inner.state.lock();
            match self.inner.try_put(&mut state, item) {
                Ok(()) => return Put::new(Deferred::resolved(()), &self.inner),
                Err(QueueFull(item)) => {
                    let waiter = Deferred::new();
                    state.putters.push_back(Putter {
                        item,
                        waiter: waiter.clone(),
                    });
                    trace!(putters = state.putters.len(), "Putter parked");
                    waiter
                }
            }
        };

        if let Some(timeout) = timeout {
            let weak = Arc::downgrade(&self.inner);
            let target = waiter.clone();
            arm_timeout(&self.inner.timer, &waiter, timeout, move || match weak.upgrade() {
                Some(inner) => inner.expire_putter(&target),
                None => {
                    target.set_error(SyncError::Timeout);
                }
            });
        }
        Put::new(waiter, &self.inner)
    }

    /// Get without waiting; fails with `QueueEmpty` when nothing is available
    pub fn get_nowait(&self) -> SyncResult<T> {
        let mut state = self.inner.state.lock();
        self.inner.try_get(&mut state)
    }

    /// Get, parking behind earlier getters while the queue is empty
    pub fn get(&self, timeout: Option<Timeout>) -> Get<T, S> {
        let waiter = {
            let mut state = self.inner.state.lock();
            match self.inner.try_get(&mut state) {
                Ok(item) => return Get::new(Deferred::resolved(item), &self.inner),
                Err(_) => {
                    let waiter = Deferred::new();
                    state.getters.push_back(waiter.clone());
                    trace!(getters = state.getters.len(), "Getter parked");
                    waiter
                }
            }
        };

        if let Some(timeout) = timeout {
            let weak = Arc::downgrade(&self.inner);
            let target = waiter.clone();
            arm_timeout(&self.inner.timer, &waiter, timeout, move || match weak.upgrade() {
                Some(inner) => inner.expire_getter(&target),
                None => {
                    target.set_error(SyncError::Timeout);
                }
            });
        }
        Get::new(waiter, &self.inner)
    }

    /// Mark one previously fetched item as processed
    ///
    /// Fails with `TaskDoneTooManyTimes` when no task is outstanding.
    pub fn task_done(&self) -> SyncResult<()> {
        let mut state = self.inner.state.lock();
        if state.unfinished_tasks == 0 {
            warn!("task_done called more times than items were put");
            return Err(SyncError::TaskDoneTooManyTimes);
        }
        state.unfinished_tasks -= 1;
        if state.unfinished_tasks == 0 {
            self.inner.finished.set();
        }
        Ok(())
    }

    /// Wait until every item put has been marked done
    pub fn join(&self, timeout: Option<Timeout>) -> EventWait {
        self.inner.finished.wait(timeout)
    }
}

impl<T, S> Queue<T, S>
where
    S: QueueStorage<T>,
{
    /// Capacity (0 = unbounded)
    #[inline]
    pub fn maxsize(&self) -> usize {
        self.inner.maxsize
    }

    /// Items currently stored
    pub fn qsize(&self) -> usize {
        self.inner.state.lock().storage.len()
    }

    pub fn empty(&self) -> bool {
        self.inner.state.lock().storage.is_empty()
    }

    /// Whether a `put_nowait` would be refused for lack of space
    pub fn full(&self) -> bool {
        let state = self.inner.state.lock();
        self.inner.is_full(&state)
    }

    pub fn unfinished_tasks(&self) -> usize {
        self.inner.state.lock().unfinished_tasks
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.inner.state.lock();
        QueueStats {
            maxsize: self.inner.maxsize,
            qsize: state.storage.len(),
            getters: state.getters.len(),
            putters: state.putters.len(),
            unfinished_tasks: state.unfinished_tasks,
        }
    }
}

impl<T, S> TryFrom<i64> for Queue<T, S>
where
    T: Send + 'static,
    S: QueueStorage<T> + Send + 'static,
{
    type Error = SyncError;

    fn try_from(maxsize: i64) -> SyncResult<Self> {
        let maxsize = usize::try_from(maxsize).map_err(|_| {
            SyncError::InvalidValue(format!("queue maxsize must be >= 0, got {}", maxsize))
        })?;
        Ok(Self::new(maxsize))
    }
}

impl<T, S> fmt::Display for Queue<T, S>
where
    S: QueueStorage<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        write!(f, "<{} maxsize={}", S::KIND, stats.maxsize)?;
        if stats.getters > 0 {
            write!(f, " getters[{}]", stats.getters)?;
        }
        if stats.putters > 0 {
            write!(f, " putters[{}]", stats.putters)?;
        }
        if stats.unfinished_tasks > 0 {
            write!(f, " tasks={}", stats.unfinished_tasks)?;
        }
        write!(f, ">")
    }
}

impl<T, S> fmt::Debug for Queue<T, S>
where
    S: QueueStorage<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(S::KIND).field("stats", &self.stats()).finish()
    }
}
