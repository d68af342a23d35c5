/*!
 * Queue Tests
 * Producer/consumer flows on a paused tokio clock
 */

use coop_sync::{Queue, SyncError, Timeout};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_producer_consumer_join() {
    let queue: Queue<u32> = Queue::new(2);

    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let queue = queue.clone();
            tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Ok(item) = queue.get(Some(Timeout::after(Duration::from_secs(1)))).await {
                    tokio::time::sleep(Duration::from_millis(u64::from(item % 3))).await;
                    seen.push(item);
                    queue.task_done()?;
                }
                Ok::<_, SyncError>(seen)
            })
        })
        .collect();

    for item in 0..20 {
        queue.put(item, None).await.unwrap();
        assert!(queue.qsize() <= 2);
    }
    queue.join(None).await.unwrap();
    assert_eq!(queue.unfinished_tasks(), 0);

    let mut all: Vec<u32> = Vec::new();
    for consumer in consumers {
        all.extend(consumer.await.unwrap().unwrap());
    }
    all.sort_unstable();
    assert_eq!(all, (0..20).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn test_put_times_out_when_full() {
    let queue: Queue<&str> = Queue::new(1);
    queue.put("first", None).await.unwrap();

    let result = queue.put("second", Some(Duration::from_millis(30).into())).await;
    assert_eq!(result, Err(SyncError::Timeout));

    // The timed-out item never entered storage
    assert_eq!(queue.get_nowait(), Ok("first"));
    assert_eq!(queue.get_nowait(), Err(SyncError::QueueEmpty));
    assert_eq!(queue.unfinished_tasks(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_get_times_out_when_empty() {
    let queue: Queue<u8> = Queue::new(0);
    let result = queue.get(Some(Duration::from_millis(30).into())).await;
    assert_eq!(result, Err(SyncError::Timeout));

    queue.put_nowait(1).unwrap();
    assert_eq!(queue.get(None).await, Ok(1));
    assert_eq!(queue.stats().getters, 0);
}

#[tokio::test(start_paused = true)]
async fn test_join_waits_for_task_done() {
    let queue: Queue<u8> = Queue::new(0);
    queue.put_nowait(1).unwrap();

    let joined = queue.join(Some(Duration::from_millis(10).into())).await;
    assert_eq!(joined, Err(SyncError::Timeout));

    let worker = tokio::spawn({
        let queue = queue.clone();
        async move {
            let item = queue.get(None).await?;
            tokio::time::sleep(Duration::from_millis(50)).await;
            queue.task_done()?;
            Ok::<_, SyncError>(item)
        }
    });
    queue.join(None).await.unwrap();
    assert_eq!(worker.await.unwrap(), Ok(1));
}

#[tokio::test(start_paused = true)]
async fn test_stream_consumes_live_items() {
    let queue: Queue<u32> = Queue::new(0);
    let producer = tokio::spawn({
        let queue = queue.clone();
        async move {
            for item in 0..5 {
                tokio::time::sleep(Duration::from_millis(10)).await;
                queue.put_nowait(item).map_err(SyncError::from)?;
            }
            Ok::<_, SyncError>(())
        }
    });

    let items: Vec<u32> = queue.stream().take(5).collect().await;
    assert_eq!(items, vec![0, 1, 2, 3, 4]);
    producer.await.unwrap().unwrap();
}

#[test]
fn test_stats_json_snapshot() {
    let queue: Queue<u8> = Queue::new(3);
    queue.put_nowait(1).unwrap();
    queue.put_nowait(2).unwrap();

    let json = serde_json::to_value(queue.stats()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "maxsize": 3,
            "qsize": 2,
            "getters": 0,
            "putters": 0,
            "unfinished_tasks": 2,
        })
    );
    assert_eq!(queue.to_string(), "<Queue maxsize=3 tasks=2>");
}
