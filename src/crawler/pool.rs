//! Fixed-size worker pool for concurrent crawls
//!
//! A set of tokio tasks pulls boxed jobs from one unbounded channel. Each job
//! runs in its own task so that a panicking job is reported without taking
//! its worker down. Aborting a worker cancels the job it is running.

use crate::SiteSearchError;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinHandle, JoinSet};

/// Unit of work executed by a pool worker
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Errors returned when handing work to the pool
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("worker pool is not accepting jobs")]
    Saturated,
}

/// Bounded set of tokio workers fed by a job queue
pub struct WorkerPool {
    sender: Mutex<Option<UnboundedSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkerPool {
    /// Spawns `size` workers on the current tokio runtime
    ///
    /// # Returns
    ///
    /// * `Ok(WorkerPool)` - Workers are running and accepting jobs
    /// * `Err(SiteSearchError::PoolStart)` - `size` is zero
    pub fn new(size: usize) -> Result<Self, SiteSearchError> {
        if size == 0 {
            return Err(SiteSearchError::PoolStart(
                "worker count must be at least 1".to_string(),
            ));
        }

        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| tokio::spawn(worker_loop(id, Arc::clone(&receiver))))
            .collect();

        tracing::debug!("Started worker pool with {} workers", size);

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            size,
        })
    }

    /// Number of workers
    pub fn size(&self) -> usize {
        self.size
    }

    /// Queues a job for execution
    ///
    /// A rejected job is dropped before this returns.
    pub fn submit(&self, job: Job) -> Result<(), PoolError> {
        let sender = match self.sender.lock().as_ref() {
            Some(sender) => sender.clone(),
            None => return Err(PoolError::Saturated),
        };
        sender.send(job).map_err(|_| PoolError::Saturated)
    }

    /// Returns true while the pool accepts jobs
    pub fn is_open(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Stops accepting jobs and waits for the workers to exit
    ///
    /// Workers finish whatever is already queued. Workers still running
    /// after `grace` are aborted.
    ///
    /// # Returns
    ///
    /// `true` if every worker exited within the grace period
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.sender.lock().take();
        let workers: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        let abort_handles: Vec<_> = workers.iter().map(|w| w.abort_handle()).collect();

        let drained = tokio::time::timeout(grace, async {
            for worker in workers {
                let _ = worker.await;
            }
        })
        .await
        .is_ok();

        if !drained {
            tracing::warn!(
                "Worker pool did not drain within {:?}; abandoning remaining work",
                grace
            );
            for handle in abort_handles {
                handle.abort();
            }
        }

        drained
    }
}

/// Pulls jobs until the channel closes
async fn worker_loop(id: usize, receiver: Arc<tokio::sync::Mutex<UnboundedReceiver<Job>>>) {
    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };

        let job = match job {
            Some(job) => job,
            None => break,
        };

        let mut running = JoinSet::new();
        running.spawn(job);
        if let Some(Err(e)) = running.join_next().await {
            if e.is_panic() {
                tracing::error!("Worker {}: job panicked", id);
            }
        }
    }

    tracing::trace!("Worker {} exiting", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_zero_workers_fails_to_start() {
        let result = WorkerPool::new(0);
        assert!(matches!(result, Err(SiteSearchError::PoolStart(_))));
    }

    #[tokio::test]
    async fn test_runs_submitted_jobs() {
        let pool = WorkerPool::new(3).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let counter = Arc::clone(&counter);
            pool.submit(Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        }

        assert!(pool.shutdown(Duration::from_secs(5)).await);
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_rejected() {
        let pool = WorkerPool::new(2).unwrap();
        assert!(pool.shutdown(Duration::from_secs(1)).await);
        assert!(!pool.is_open());

        let result = pool.submit(Box::pin(async {}));
        assert_eq!(result, Err(PoolError::Saturated));
    }

    #[tokio::test]
    async fn test_panicking_job_keeps_worker_alive() {
        let pool = WorkerPool::new(1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        pool.submit(Box::pin(async {
            panic!("boom");
        }))
        .unwrap();
        let after = Arc::clone(&counter);
        pool.submit(Box::pin(async move {
            after.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

        assert!(pool.shutdown(Duration::from_secs(5)).await);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_grace_period_expires() {
        let pool = WorkerPool::new(1).unwrap();
        pool.submit(Box::pin(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }))
        .unwrap();

        assert!(!pool.shutdown(Duration::from_millis(50)).await);
    }

    #[tokio::test]
    async fn test_expired_grace_cancels_running_job() {
        struct DropFlag(Arc<AtomicUsize>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let pool = WorkerPool::new(1).unwrap();
        let dropped = Arc::new(AtomicUsize::new(0));
        let flag = DropFlag(Arc::clone(&dropped));
        pool.submit(Box::pin(async move {
            let _flag = flag;
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }))
        .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pool.shutdown(Duration::from_millis(50)).await);

        // The job task is aborted along with its worker
        tokio::time::timeout(Duration::from_secs(5), async {
            while dropped.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }
}
