use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::models::error::PersistenceError;

/// Bounded pool for fire-and-forget persistence work.
///
/// Tasks are spawned detached: the caller gets no handle, and a failure is
/// only ever logged. Delivery is at-most-once and best-effort; a task still
/// queued when the runtime shuts down is dropped.
#[derive(Clone)]
pub struct PersistencePool {
    permits: Arc<Semaphore>,
}

impl PersistencePool {
    pub fn new(workers: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Spawn `task` onto the current Tokio runtime. At most `workers` tasks
    /// run at once; the rest wait for a permit.
    pub fn spawn_detached<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), PersistenceError>> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                log::warn!("{}: persistence pool closed, task dropped", label);
                return;
            };
            match task.await {
                Ok(()) => log::debug!("{}: persisted", label),
                Err(e) => log::error!("{}: {}", label, e),
            }
        });
    }

    /// Permits not currently held by a running task.
    pub fn idle_workers(&self) -> usize {
        self.permits.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn runs_tasks_without_caller_handle() {
        let pool = PersistencePool::new(2);
        let (tx, rx) = oneshot::channel();

        pool.spawn_detached("test", async move {
            let _ = tx.send(());
            Ok(())
        });

        tokio::time::timeout(Duration::from_secs(1), rx).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn failures_do_not_escape() {
        let pool = PersistencePool::new(1);
        pool.spawn_detached("failing", async {
            Err(PersistenceError::UnderlyingIoFailure("disk".into()))
        });

        let (tx, rx) = oneshot::channel();
        pool.spawn_detached("after", async move {
            let _ = tx.send(());
            Ok(())
        });
        tokio::time::timeout(Duration::from_secs(1), rx).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let pool = PersistencePool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            let done = Arc::clone(&done);
            pool.spawn_detached("bounded", async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        for _ in 0..200 {
            if done.load(Ordering::SeqCst) == 8 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(done.load(Ordering::SeqCst), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
