/*!
 * Queue Ordering Tests
 * Model-based checks of every storage against std collections
 */

use coop_sync::queue::QueueStorage;
use coop_sync::{LifoQueue, ManualTimer, PriorityQueue, Queue, SyncConfig, SyncError};
use proptest::prelude::*;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Put(i32),
    Get,
    AbandonGet,
    TaskDone,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (-50i32..50).prop_map(Op::Put),
        2 => Just(Op::Get),
        1 => Just(Op::AbandonGet),
        1 => Just(Op::TaskDone),
    ]
}

fn config() -> SyncConfig {
    SyncConfig::with_timer(Arc::new(ManualTimer::new()))
}

/// Reference ordering for each queue flavour
trait Model: Default {
    fn push(&mut self, item: i32);
    fn pop(&mut self) -> Option<i32>;
    fn len(&self) -> usize;
}

#[derive(Default)]
struct FifoModel(VecDeque<i32>);

impl Model for FifoModel {
    fn push(&mut self, item: i32) {
        self.0.push_back(item);
    }
    fn pop(&mut self) -> Option<i32> {
        self.0.pop_front()
    }
    fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Default)]
struct LifoModel(Vec<i32>);

impl Model for LifoModel {
    fn push(&mut self, item: i32) {
        self.0.push(item);
    }
    fn pop(&mut self) -> Option<i32> {
        self.0.pop()
    }
    fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Default)]
struct PriorityModel(BinaryHeap<Reverse<i32>>);

impl Model for PriorityModel {
    fn push(&mut self, item: i32) {
        self.0.push(Reverse(item));
    }
    fn pop(&mut self) -> Option<i32> {
        self.0.pop().map(|Reverse(item)| item)
    }
    fn len(&self) -> usize {
        self.0.len()
    }
}

fn check_against_model<S, M>(queue: Queue<i32, S>, ops: Vec<Op>) -> Result<(), TestCaseError>
where
    S: QueueStorage<i32> + Send + 'static,
    M: Model,
{
    let maxsize = queue.maxsize();
    let mut model = M::default();
    let mut unfinished = 0usize;

    for op in ops {
        match op {
            Op::Put(item) => {
                let full = maxsize > 0 && model.len() >= maxsize;
                match queue.put_nowait(item) {
                    Ok(()) => {
                        prop_assert!(!full);
                        model.push(item);
                        unfinished += 1;
                    }
                    Err(rejected) => {
                        prop_assert!(full);
                        prop_assert_eq!(rejected.into_inner(), item);
                    }
                }
            }
            Op::Get => match model.pop() {
                Some(expected) => prop_assert_eq!(queue.get_nowait(), Ok(expected)),
                None => prop_assert_eq!(queue.get_nowait(), Err(SyncError::QueueEmpty)),
            },
            // An unpolled get either resolves at once or parks; dropping it
            // must leave storage exactly as it was
            Op::AbandonGet => drop(queue.get(None)),
            Op::TaskDone => {
                if unfinished == 0 {
                    prop_assert_eq!(queue.task_done(), Err(SyncError::TaskDoneTooManyTimes));
                } else {
                    prop_assert_eq!(queue.task_done(), Ok(()));
                    unfinished -= 1;
                }
            }
        }

        prop_assert_eq!(queue.qsize(), model.len());
        prop_assert_eq!(queue.unfinished_tasks(), unfinished);
        if maxsize > 0 {
            prop_assert!(queue.qsize() <= maxsize);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn fifo_matches_model(maxsize in 0usize..6, ops in proptest::collection::vec(arb_op(), 0..80)) {
        let queue: Queue<i32> = Queue::with_config(maxsize, config());
        check_against_model::<_, FifoModel>(queue, ops)?;
    }

    #[test]
    fn lifo_matches_model(maxsize in 0usize..6, ops in proptest::collection::vec(arb_op(), 0..80)) {
        let queue: LifoQueue<i32> = LifoQueue::with_config(maxsize, config());
        check_against_model::<_, LifoModel>(queue, ops)?;
    }

    #[test]
    fn priority_matches_model(maxsize in 0usize..6, ops in proptest::collection::vec(arb_op(), 0..80)) {
        let queue: PriorityQueue<i32> = PriorityQueue::with_config(maxsize, config());
        check_against_model::<_, PriorityModel>(queue, ops)?;
    }
}

#[test]
fn test_priority_tuples_ascending() {
    let queue: PriorityQueue<(u8, &str)> = PriorityQueue::with_config(0, config());
    for entry in [(3, "c"), (1, "a"), (2, "b")] {
        queue.put_nowait(entry).unwrap();
    }
    let drained: Vec<_> = std::iter::from_fn(|| queue.get_nowait().ok()).collect();
    assert_eq!(drained, vec![(1, "a"), (2, "b"), (3, "c")]);
}
