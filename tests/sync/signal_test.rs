/*!
 * Condition and Event Tests
 * End-to-end on a paused tokio clock with the default timer
 */

use coop_sync::{Condition, Event, SyncError, Timeout};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

#[tokio::test(start_paused = true)]
async fn test_condition_wakes_in_arrival_order() {
    let condition = Condition::new();
    let woken = Arc::new(AsyncMutex::new(Vec::new()));

    let tasks: Vec<_> = (0..3)
        .map(|id| {
            let condition = condition.clone();
            let woken = Arc::clone(&woken);
            tokio::spawn(async move {
                let notified = condition.wait(None).await?;
                woken.lock().await.push(id);
                Ok::<_, SyncError>(notified)
            })
        })
        .collect();

    // Let every task park before notifying
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(condition.waiters(), 3);

    for _ in 0..3 {
        assert_eq!(condition.notify(1), 1);
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), Ok(true));
    }
    assert_eq!(*woken.lock().await, vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_condition_timeout_returns_false() {
    let condition = Condition::new();
    let notified = condition.wait(Some(Timeout::after(Duration::from_millis(50)))).await;
    assert_eq!(notified, Ok(false));
    assert_eq!(condition.notify(1), 0);
}

#[tokio::test(start_paused = true)]
async fn test_condition_gc_bounds_retry_loop() {
    let condition = Condition::new();
    for _ in 0..1_000 {
        let notified = condition.wait(Some(Duration::from_millis(1).into())).await;
        assert_eq!(notified, Ok(false));
    }
    assert!(condition.waiters() < 100);
}

#[tokio::test(start_paused = true)]
async fn test_event_gate_releases_all() {
    let event = Event::new();
    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let event = event.clone();
            tokio::spawn(async move { event.wait(Some(Timeout::after(Duration::from_secs(1)))).await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(100)).await;
    event.set();
    for task in tasks {
        assert_eq!(task.await.unwrap(), Ok(()));
    }
}

#[tokio::test(start_paused = true)]
async fn test_event_clear_then_timeout() {
    let event = Event::new();
    event.set();
    assert_eq!(event.wait(None).await, Ok(()));

    event.clear();
    let result = event.wait(Some(Duration::from_millis(20).into())).await;
    assert_eq!(result, Err(SyncError::Timeout));
    assert!(!event.is_set());
}
