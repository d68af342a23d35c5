/*!
 * Semaphore Tests
 * Fairness, bounds and timeout/release races driven by a manual clock
 */

use coop_sync::sync::Acquire;
use coop_sync::{
    BoundedSemaphore, ManualTimer, Semaphore, SemaphoreGuard, SyncConfig, SyncError, Timeout, Timer,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;
use tokio_test::task::{self, Spawn};
use tokio_test::{assert_pending, assert_ready, assert_ready_ok};

fn manual_config() -> (SyncConfig, Arc<ManualTimer>) {
    let timer = Arc::new(ManualTimer::new());
    (SyncConfig::with_timer(timer.clone()), timer)
}

#[test]
fn test_fifo_fairness_after_exhaustion() {
    let (config, _) = manual_config();
    let sem = Semaphore::with_config(3, config);

    let held: Vec<SemaphoreGuard> = (0..3)
        .map(|_| assert_ready_ok!(task::spawn(sem.acquire(None)).poll()))
        .collect();
    assert_eq!(sem.value(), 0);

    let mut waiters: Vec<_> = (0..3).map(|_| task::spawn(sem.acquire(None))).collect();
    for waiter in waiters.iter_mut() {
        assert_pending!(waiter.poll());
    }

    let mut order = Vec::new();
    for guard in held {
        guard.release().unwrap();
        for (i, waiter) in waiters.iter_mut().enumerate() {
            if order.contains(&i) {
                continue;
            }
            if let Poll::Ready(result) = waiter.poll() {
                assert!(result.is_ok());
                order.push(i);
            }
        }
    }
    assert_eq!(order, vec![0, 1, 2]);
}

#[test]
fn test_release_before_deadline_wins() {
    let (config, timer) = manual_config();
    let sem = Semaphore::with_config(0, config);
    let mut waiter = task::spawn(sem.acquire(Some(Timeout::after(Duration::from_millis(10)))));
    assert_pending!(waiter.poll());
    assert_eq!(timer.pending(), 1);

    sem.release();
    assert_eq!(timer.pending(), 0);
    timer.advance(Duration::from_millis(10));

    let guard = assert_ready_ok!(waiter.poll());
    assert_eq!(sem.value(), 0);
    drop(guard);
    assert_eq!(sem.value(), 1);
}

#[test]
fn test_deadline_before_release_wins() {
    let (config, timer) = manual_config();
    let sem = Semaphore::with_config(0, config);
    let mut waiter = task::spawn(sem.acquire(Some(Timeout::after(Duration::from_millis(10)))));
    assert_pending!(waiter.poll());

    timer.advance(Duration::from_millis(10));
    sem.release();

    assert_eq!(assert_ready!(waiter.poll()).unwrap_err(), SyncError::Timeout);
    assert_eq!(sem.value(), 1);
}

#[test]
fn test_absolute_deadline() {
    let (config, timer) = manual_config();
    let sem = Semaphore::with_config(0, config);
    let deadline = timer.now() + Duration::from_secs(3);
    let mut waiter = task::spawn(sem.acquire(Some(Timeout::at(deadline))));

    timer.advance(Duration::from_secs(2));
    assert_pending!(waiter.poll());
    timer.advance(Duration::from_secs(1));
    assert_eq!(assert_ready!(waiter.poll()).unwrap_err(), SyncError::Timeout);
}

#[test]
fn test_max_delay_waits_unbounded() {
    let (config, timer) = manual_config();
    let sem = Semaphore::with_config(0, config);
    let mut waiter = task::spawn(sem.acquire(Some(Timeout::after(Duration::MAX))));
    assert_pending!(waiter.poll());
    assert_eq!(timer.pending(), 0);

    timer.advance(Duration::from_secs(86_400 * 365));
    assert_pending!(waiter.poll());

    sem.release();
    let _guard = assert_ready_ok!(waiter.poll());
    assert_eq!(sem.value(), 0);
}

#[test]
fn test_bounded_release_drift_detected() {
    let (config, _) = manual_config();
    let sem = BoundedSemaphore::with_config(1, config);
    let guard = assert_ready_ok!(task::spawn(sem.acquire(None)).poll());

    sem.release().unwrap();
    // The guard's own release now overshoots the bound; it is logged, not raised
    drop(guard);
    assert_eq!(sem.value(), 1);
    assert_eq!(sem.release(), Err(SyncError::ReleasedTooManyTimes));
}

#[test]
fn test_display_matches_state() {
    let (config, _) = manual_config();
    let sem = BoundedSemaphore::with_config(1, config);
    assert_eq!(sem.to_string(), "<BoundedSemaphore [unlocked,value:1]>");
    let _guard = assert_ready_ok!(task::spawn(sem.acquire(None)).poll());
    assert_eq!(sem.to_string(), "<BoundedSemaphore [locked]>");
}

#[derive(Debug, Clone)]
enum Op {
    Acquire { timeout_ms: Option<u64> },
    DropGuard(usize),
    Advance(u64),
    AbandonWaiter(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => proptest::option::of(1u64..20).prop_map(|timeout_ms| Op::Acquire { timeout_ms }),
        3 => any::<usize>().prop_map(Op::DropGuard),
        1 => (1u64..20).prop_map(Op::Advance),
        1 => any::<usize>().prop_map(Op::AbandonWaiter),
    ]
}

/// Poll every parked acquire, moving granted permits into `guards`
fn settle(pending: &mut Vec<Spawn<Acquire>>, guards: &mut Vec<SemaphoreGuard>) {
    let mut still_pending = Vec::new();
    for mut waiter in pending.drain(..) {
        match waiter.poll() {
            Poll::Ready(Ok(guard)) => guards.push(guard),
            Poll::Ready(Err(err)) => assert_eq!(err, SyncError::Timeout),
            Poll::Pending => still_pending.push(waiter),
        }
    }
    *pending = still_pending;
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Permits are conserved and never idle while a live acquirer waits
    #[test]
    fn bounded_semaphore_conserves_permits(
        initial in 1usize..5,
        ops in proptest::collection::vec(arb_op(), 1..64),
    ) {
        let (config, timer) = manual_config();
        let sem = BoundedSemaphore::with_config(initial, config);
        let mut pending: Vec<Spawn<Acquire>> = Vec::new();
        let mut guards: Vec<SemaphoreGuard> = Vec::new();

        for op in ops {
            match op {
                Op::Acquire { timeout_ms } => {
                    let timeout = timeout_ms.map(|ms| Timeout::after(Duration::from_millis(ms)));
                    pending.push(task::spawn(sem.acquire(timeout)));
                }
                Op::DropGuard(i) if !guards.is_empty() => {
                    let guard = guards.remove(i % guards.len());
                    prop_assert!(guard.release().is_ok());
                }
                Op::AbandonWaiter(i) if !pending.is_empty() => {
                    drop(pending.remove(i % pending.len()));
                }
                Op::Advance(ms) => {
                    timer.advance(Duration::from_millis(ms));
                }
                _ => {}
            }
            settle(&mut pending, &mut guards);

            prop_assert!(sem.value() <= initial);
            prop_assert_eq!(sem.value() + guards.len(), initial);
            if sem.value() > 0 {
                prop_assert!(pending.is_empty());
            }
        }

        drop(pending);
        guards.clear();
        prop_assert_eq!(sem.value(), initial);
        prop_assert_eq!(sem.release(), Err(SyncError::ReleasedTooManyTimes));
    }
}
