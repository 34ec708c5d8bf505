//! Dynamic join barrier for concurrent crawls
//!
//! Jobs register before they are submitted and release when they finish.
//! The number of parties grows while the crawl runs, so the barrier behaves
//! like a wait-group: waiters wake once the count drops back to zero.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Counting wait-group shared by the coordinator and its jobs
#[derive(Debug, Default)]
pub struct JoinBarrier {
    parties: AtomicUsize,
    quiescent: Notify,
}

impl JoinBarrier {
    /// Creates a barrier with no outstanding parties
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more outstanding party
    pub fn register(&self) {
        self.parties.fetch_add(1, Ordering::AcqRel);
    }

    /// Releases one party, waking waiters when none remain
    pub fn release(&self) {
        let previous = self.parties.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "barrier released more times than registered");
        if previous == 1 {
            self.quiescent.notify_waiters();
        }
    }

    /// Number of parties still outstanding
    pub fn pending(&self) -> usize {
        self.parties.load(Ordering::Acquire)
    }

    /// Waits until every registered party has released
    pub async fn wait(&self) {
        loop {
            let notified = self.quiescent.notified();
            tokio::pin!(notified);
            // Enabled before the check so a release in between is not lost
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Waits for quiescence, giving up after `timeout`
    ///
    /// # Returns
    ///
    /// `true` if the barrier quiesced in time
    pub async fn wait_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait()).await.is_ok()
    }
}

/// Releases its party when dropped, including during a panic unwind
#[derive(Debug)]
pub struct BarrierGuard {
    barrier: Arc<JoinBarrier>,
}

impl BarrierGuard {
    /// Wraps a party that has already been registered
    pub fn new(barrier: Arc<JoinBarrier>) -> Self {
        Self { barrier }
    }
}

impl Drop for BarrierGuard {
    fn drop(&mut self) {
        self.barrier.release();
    }
}
