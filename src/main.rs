/*!
 * Coop Sync - Demo Entry Point
 *
 * Runs the classic coordination scenarios on a single-threaded runtime:
 * - Producer/consumer with completion tracking
 * - Semaphore-limited workers
 * - Event gate
 * - Lock with a bounded wait
 */

use coop_sync::{init_tracing, Event, Lock, Queue, Semaphore, SyncError, Timeout};
use miette::{IntoDiagnostic, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const WORKERS: usize = 3;
const JOBS: u64 = 12;

async fn producer_consumer() -> Result<()> {
    info!("Scenario: producer/consumer");
    let queue: Queue<u64> = Queue::new(4);

    let mut workers = Vec::with_capacity(WORKERS);
    for id in 0..WORKERS {
        let queue = queue.clone();
        workers.push(tokio::spawn(async move {
            let mut handled = 0usize;
            while let Ok(job) = queue.get(None).await {
                tokio::time::sleep(Duration::from_millis(job % 5)).await;
                handled += 1;
                if queue.task_done().is_err() {
                    break;
                }
            }
            (id, handled)
        }));
    }

    for job in 0..JOBS {
        queue.put(job, None).await?;
    }
    info!(queue = %queue, "All jobs queued");

    queue.join(Some(Timeout::after(Duration::from_secs(5)))).await?;
    let stats = queue.stats();
    info!(stats = %serde_json::to_string(&stats).into_diagnostic()?, "All jobs done");

    for worker in workers {
        worker.abort();
    }
    Ok(())
}

async fn limited_workers() -> Result<()> {
    info!("Scenario: semaphore-limited workers");
    let semaphore = Semaphore::new(2);
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for id in 0..5 {
        let semaphore = semaphore.clone();
        let active = Arc::clone(&active);
        let peak = Arc::clone(&peak);
        tasks.push(tokio::spawn(async move {
            let permit = semaphore.acquire(None).await?;
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            info!(worker = id, active = now, "Working");
            tokio::time::sleep(Duration::from_millis(10)).await;
            active.fetch_sub(1, Ordering::SeqCst);
            permit.release()
        }));
    }
    for task in tasks {
        task.await.into_diagnostic()??;
    }
    info!(peak = peak.load(Ordering::SeqCst), semaphore = %semaphore, "Workers finished");
    Ok(())
}

async fn event_gate() -> Result<()> {
    info!("Scenario: event gate");
    let event = Event::new();

    let waiters: Vec<_> = (0..3)
        .map(|id| {
            let event = event.clone();
            tokio::spawn(async move {
                event.wait(None).await?;
                info!(waiter = id, "Released by event");
                Ok::<_, SyncError>(())
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(20)).await;
    event.set();
    for waiter in waiters {
        waiter.await.into_diagnostic()??;
    }
    info!(event = %event, "Event scenario done");
    Ok(())
}

async fn bounded_lock() -> Result<()> {
    info!("Scenario: lock with bounded wait");
    let lock = Lock::new();
    let guard = lock.acquire(None).await?;

    match lock.acquire(Some(Duration::from_millis(15).into())).await {
        Err(SyncError::Timeout) => info!(lock = %lock, "Contended acquire timed out as expected"),
        Err(err) => return Err(err.into()),
        Ok(_) => warn!("Acquired a lock that should have been held"),
    }

    guard.release()?;
    if let Err(err) = lock.release() {
        info!(error = %err, "Releasing an unlocked lock is refused");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    info!("coop-sync demo starting");
    producer_consumer().await?;
    limited_workers().await?;
    event_gate().await?;
    bounded_lock().await?;
    info!("coop-sync demo finished");
    Ok(())
}
