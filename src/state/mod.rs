//! State module for tracking crawl progress
//!
//! A coordinator runs exactly one crawl. Its lifecycle is tracked by
//! [`CrawlState`], guarded by a [`CrawlLifecycle`] that rejects illegal
//! transitions such as starting a crawl twice.
//!
//! # Components
//!
//! - `CrawlState`: Idle, Running, Draining or Done
//! - `CrawlLifecycle`: Thread-safe holder enforcing the transition order

mod crawl_state;

// Re-export main types
pub use crawl_state::{CrawlLifecycle, CrawlState};
