//! Lifecycle states of a single crawl run

use crate::SiteSearchError;
use parking_lot::Mutex;
use std::fmt;

/// Represents the current state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Coordinator constructed, no crawl started
    Idle,

    /// Pages are being admitted and fetched
    Running,

    /// Work has quiesced; the worker pool is shutting down
    Draining,

    /// The run has finished; the coordinator cannot be reused
    Done,
}

impl CrawlState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from this state to `next` is allowed
    ///
    /// Sequential runs go straight from Running to Done; concurrent runs
    /// pass through Draining.
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Running, Self::Done)
                | (Self::Draining, Self::Done)
        )
    }

    /// Converts the state to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared, mutex-guarded crawl state
#[derive(Debug)]
pub struct CrawlLifecycle {
    state: Mutex<CrawlState>,
}

impl Default for CrawlLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlLifecycle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CrawlState::Idle),
        }
    }

    /// Returns the current state
    pub fn current(&self) -> CrawlState {
        *self.state.lock()
    }

    /// Moves to `next`, failing if the transition is not allowed
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The state is now `next`
    /// * `Err(SiteSearchError::InvalidTransition)` - The state is unchanged
    pub fn transition(&self, next: CrawlState) -> Result<(), SiteSearchError> {
        let mut state = self.state.lock();
        if !state.can_transition_to(next) {
            return Err(SiteSearchError::InvalidTransition {
                from: *state,
                to: next,
            });
        }
        tracing::debug!("Crawl state {} -> {}", *state, next);
        *state = next;
        Ok(())
    }
}
