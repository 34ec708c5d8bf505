//! Visit reservation and global page cap
//!
//! The frontier is the single gate every URL passes before it is fetched.
//! Reservation is atomic across tasks: a canonical URL is admitted at most
//! once and the number of admissions never exceeds the page cap.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Admissions between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Shared visited set plus page counter
#[derive(Debug)]
pub struct Frontier {
    visited: Mutex<HashSet<String>>,
    admitted: AtomicUsize,
    max_pages: usize,
}

impl Frontier {
    /// Creates an empty frontier with the given page cap
    pub fn new(max_pages: usize) -> Self {
        Self {
            visited: Mutex::new(HashSet::new()),
            admitted: AtomicUsize::new(0),
            max_pages,
        }
    }

    /// Attempts to claim a canonical URL for fetching
    ///
    /// # Reservation Steps
    ///
    /// 1. Insert into the visited set; already present → rejected
    /// 2. Compare-and-swap the page counter from `curr` to `curr + 1`,
    ///    only while `curr < max_pages`
    /// 3. Cap reached → remove the URL from the visited set again
    ///
    /// # Arguments
    ///
    /// * `url` - A canonical URL
    ///
    /// # Returns
    ///
    /// `true` exactly once per admitted URL, `false` for duplicates and for
    /// any URL arriving after the cap is reached
    pub fn try_reserve(&self, url: &str) -> bool {
        if !self.visited.lock().insert(url.to_string()) {
            return false;
        }

        let mut current = self.admitted.load(Ordering::Acquire);
        loop {
            if current >= self.max_pages {
                // Rolled back so the visited set keeps matching the counter
                self.visited.lock().remove(url);
                return false;
            }

            match self.admitted.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        let count = current + 1;
        if count % PROGRESS_INTERVAL == 0 || count == self.max_pages {
            tracing::info!("Visited {} / {} pages...", count, self.max_pages);
        }
        true
    }

    /// Number of URLs admitted so far
    pub fn admitted(&self) -> usize {
        self.admitted.load(Ordering::Acquire)
    }

    /// Returns true once the page cap has been reached
    pub fn is_full(&self) -> bool {
        self.admitted() >= self.max_pages
    }

    /// Admission cap for the crawl
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Number of URLs currently held in the visited set
    pub fn visited_len(&self) -> usize {
        self.visited.lock().len()
    }

    /// Returns true if the canonical URL has been claimed
    pub fn contains(&self, url: &str) -> bool {
        self.visited.lock().contains(url)
    }
}
