//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` trait
//! - HTML link extraction behind the `LinkExtractor` trait
//! - The frontier gate that deduplicates URLs and enforces the page cap
//! - The worker pool and join barrier used by concurrent crawls
//! - Overall crawl coordination

mod barrier;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod pool;

pub use barrier::{BarrierGuard, JoinBarrier};
pub use coordinator::{Coordinator, CrawlMode, CrawlReport};
pub use fetcher::{build_http_client, FetchFailure, HttpFetcher, PageFetcher};
pub use frontier::Frontier;
pub use parser::{HtmlLinkExtractor, LinkExtractor};
pub use pool::{Job, PoolError, WorkerPool};

use crate::config::Config;
use crate::output::PageSink;
use std::sync::Arc;

/// Runs a complete crawl with HTTP fetching and HTML link extraction
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `mode` - Sequential or concurrent scheduling
/// * `sink` - Where fetched pages are stored
/// * `seed` - The starting URL; its host becomes the base domain
/// * `depth` - Levels of links to follow (the seed is level 1)
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(SiteSearchError)` - Crawl could not run
pub async fn crawl(
    config: Config,
    mode: CrawlMode,
    sink: Arc<dyn PageSink>,
    seed: &str,
    depth: i32,
) -> crate::Result<CrawlReport> {
    Coordinator::new(config, mode, sink)?.crawl(seed, depth).await
}
