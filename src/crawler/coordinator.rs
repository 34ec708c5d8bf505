//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Deriving the base domain from the seed
//! - Admitting URLs through the frontier
//! - Coordinating fetching, storing, and link extraction
//! - Running sequentially or on a worker pool
//! - Reporting the run's results

use crate::config::Config;
use crate::crawler::barrier::{BarrierGuard, JoinBarrier};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::pool::WorkerPool;
use crate::output::PageSink;
use crate::state::{CrawlLifecycle, CrawlState};
use crate::url::{canonicalize, extract_host, is_crawlable_resource, DomainPolicy};
use crate::{Result, SiteSearchError};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use url::Url;

/// How a crawl schedules its pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlMode {
    /// One page at a time on the calling task
    Sequential,

    /// Pages fetched in parallel on a worker pool
    Concurrent,
}

impl CrawlMode {
    /// Parses the command line mode argument
    ///
    /// `m`, `multi` and `mt` (any case) select concurrent mode; anything
    /// else is sequential.
    pub fn from_arg(arg: &str) -> Self {
        match arg.trim().to_lowercase().as_str() {
            "m" | "multi" | "mt" => Self::Concurrent,
            _ => Self::Sequential,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Concurrent => "concurrent",
        }
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    /// URLs admitted by the frontier
    pub pages_admitted: usize,

    /// Pages fetched with content and stored by the sink
    pub pages_stored: usize,

    /// In-domain hosts seen on fetched pages, sorted
    pub discovered_hosts: Vec<String>,

    pub elapsed: Duration,

    pub mode: CrawlMode,

    /// True if the crawl stalled or the pool grace period expired with work outstanding
    pub abandoned: bool,
}

/// State shared by every page processed in one crawl
struct CrawlContext {
    frontier: Frontier,
    policy: DomainPolicy,
    hosts: Mutex<HashSet<String>>,
    stored: AtomicUsize,
    /// Pages whose processing has finished, stored or not
    finished: AtomicUsize,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn LinkExtractor>,
    sink: Arc<dyn PageSink>,
}

impl CrawlContext {
    fn new(
        policy: DomainPolicy,
        max_pages: usize,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn LinkExtractor>,
        sink: Arc<dyn PageSink>,
    ) -> Self {
        Self {
            frontier: Frontier::new(max_pages),
            policy,
            hosts: Mutex::new(HashSet::new()),
            stored: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            fetcher,
            extractor,
            sink,
        }
    }

    /// Fetches, stores and scans one admitted page
    ///
    /// # Page Flow
    ///
    /// 1. Fetch; empty content makes the page a leaf
    /// 2. Record the page's host
    /// 3. Store the content (failures are logged, the crawl continues)
    /// 4. Extract links, stopping once the page cap is reached
    ///
    /// # Returns
    ///
    /// Canonical, in-domain, HTML-looking links in extraction order
    async fn process_page(&self, url: &Url) -> Vec<Url> {
        let links = self.scan_page(url).await;
        self.finished.fetch_add(1, Ordering::AcqRel);
        links
    }

    async fn scan_page(&self, url: &Url) -> Vec<Url> {
        let content = self.fetcher.fetch(url.as_str()).await;
        if content.is_empty() {
            tracing::debug!("No content from {}", url);
            return Vec::new();
        }

        self.record_host(url);

        match self.sink.store(url.as_str(), &content) {
            Ok(_) => {
                self.stored.fetch_add(1, Ordering::AcqRel);
            }
            Err(e) => tracing::error!("Failed to store {}: {}", url, e),
        }

        let mut links = Vec::new();
        for raw in self.extractor.extract(&content, url) {
            if self.frontier.is_full() {
                break;
            }
            if let Some(link) = self.admissible_link(&raw) {
                links.push(link);
            }
        }
        links
    }

    /// Applies the resource filter, canonicalization and domain policy
    fn admissible_link(&self, raw: &str) -> Option<Url> {
        if !is_crawlable_resource(raw) {
            tracing::trace!("Skipping non-HTML resource {}", raw);
            return None;
        }

        let link = match canonicalize(raw) {
            Ok(link) => link,
            Err(e) => {
                tracing::debug!("Skipping link: {}", e);
                return None;
            }
        };

        if !self.policy.url_in_domain(&link) {
            tracing::trace!("Skipping cross-domain link {}", link);
            return None;
        }

        Some(link)
    }

    fn record_host(&self, url: &Url) {
        if let Some(host) = extract_host(url) {
            if self.policy.same_domain(&host) {
                self.hosts.lock().insert(host);
            }
        }
    }

    fn sorted_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self.hosts.lock().iter().cloned().collect();
        hosts.sort();
        hosts
    }
}

/// Main crawler coordinator structure
///
/// A coordinator runs exactly one crawl; calling [`Coordinator::crawl`]
/// again fails with [`SiteSearchError::InvalidTransition`].
pub struct Coordinator {
    config: Arc<Config>,
    mode: CrawlMode,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn LinkExtractor>,
    sink: Arc<dyn PageSink>,
    lifecycle: CrawlLifecycle,
    base_domain: OnceLock<DomainPolicy>,
}

impl Coordinator {
    /// Creates a new coordinator using HTTP fetching and HTML link extraction
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `mode` - Sequential or concurrent scheduling
    /// * `sink` - Where fetched pages are stored
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SiteSearchError)` - The HTTP client could not be built
    pub fn new(config: Config, mode: CrawlMode, sink: Arc<dyn PageSink>) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_components(
            config,
            mode,
            Arc::new(fetcher),
            Arc::new(HtmlLinkExtractor::new()),
            sink,
        ))
    }

    /// Creates a coordinator from explicit collaborators
    pub fn with_components(
        config: Config,
        mode: CrawlMode,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn LinkExtractor>,
        sink: Arc<dyn PageSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            mode,
            fetcher,
            extractor,
            sink,
            lifecycle: CrawlLifecycle::new(),
            base_domain: OnceLock::new(),
        }
    }

    pub fn mode(&self) -> CrawlMode {
        self.mode
    }

    pub fn state(&self) -> CrawlState {
        self.lifecycle.current()
    }

    /// The base domain, once a crawl has accepted its seed
    pub fn base_domain(&self) -> Option<&str> {
        self.base_domain.get().map(DomainPolicy::base_domain)
    }

    /// Crawls the seed's domain to `depth` levels
    ///
    /// A depth of zero or less admits nothing.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl ran to completion
    /// * `Err(SiteSearchError::InvalidSeed)` - The seed could not be parsed
    /// * `Err(SiteSearchError::InvalidTransition)` - The coordinator was already used
    /// * `Err(SiteSearchError::PoolStart)` - Concurrent mode with no workers
    pub async fn crawl(&self, seed: &str, depth: i32) -> Result<CrawlReport> {
        self.lifecycle.transition(CrawlState::Running)?;

        let policy = match DomainPolicy::from_seed(seed) {
            Ok(policy) => policy,
            Err(source) => {
                self.lifecycle.transition(CrawlState::Done)?;
                return Err(SiteSearchError::InvalidSeed {
                    url: seed.to_string(),
                    source,
                });
            }
        };
        let policy = self.base_domain.get_or_init(|| policy).clone();

        tracing::info!(
            "Starting {} crawl of {} (base domain {}, depth {}, max {} pages)",
            self.mode,
            seed,
            policy.base_domain(),
            depth,
            self.config.crawler.max_pages
        );

        let ctx = Arc::new(CrawlContext::new(
            policy,
            self.config.crawler.max_pages,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.extractor),
            Arc::clone(&self.sink),
        ));

        let start = Instant::now();
        let outcome = match self.mode {
            CrawlMode::Sequential => {
                crawl_sequential(&ctx, seed, depth).await;
                Ok(false)
            }
            CrawlMode::Concurrent => self.crawl_concurrent(&ctx, seed, depth).await,
        };

        self.lifecycle.transition(CrawlState::Done)?;
        let abandoned = outcome?;

        let report = CrawlReport {
            pages_admitted: ctx.frontier.admitted(),
            pages_stored: ctx.stored.load(Ordering::Acquire),
            discovered_hosts: ctx.sorted_hosts(),
            elapsed: start.elapsed(),
            mode: self.mode,
            abandoned,
        };

        tracing::info!("Finished crawling. Total pages: {}", report.pages_admitted);
        Ok(report)
    }

    /// Runs the crawl on a worker pool
    ///
    /// The coordinator waits for the barrier to quiesce as long as jobs keep
    /// finishing. A full grace period with no finished job counts as a stall:
    /// the pool is then shut down and the outstanding jobs are abandoned.
    ///
    /// # Returns
    ///
    /// Whether outstanding work was abandoned
    async fn crawl_concurrent(
        &self,
        ctx: &Arc<CrawlContext>,
        seed: &str,
        depth: i32,
    ) -> Result<bool> {
        let workers = self.config.crawler.effective_workers();
        let pool = Arc::new(WorkerPool::new(workers)?);
        let barrier = Arc::new(JoinBarrier::new());
        tracing::info!("Crawling with {} workers", workers);

        if depth > 0 {
            match canonicalize(seed) {
                Ok(url) if ctx.frontier.try_reserve(url.as_str()) => {
                    submit_page(ctx, &pool, &barrier, url, depth);
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("Skipping seed: {}", e),
            }
        }

        let grace = self.config.crawler.shutdown_grace();
        let quiesced = await_quiescence(&barrier, ctx, grace).await;
        if !quiesced {
            tracing::warn!(
                "No page finished within {:?}; abandoning {} pending jobs",
                grace,
                barrier.pending()
            );
        }
        self.lifecycle.transition(CrawlState::Draining)?;

        let drained = pool.shutdown(grace).await;
        if !drained {
            tracing::warn!("{} jobs still pending after {:?}", barrier.pending(), grace);
        }
        Ok(!quiesced || !drained)
    }
}

/// Waits for the barrier while the crawl keeps making progress
///
/// # Returns
///
/// `true` once every job has finished, `false` if a whole `grace` period
/// passed without any page finishing
async fn await_quiescence(barrier: &JoinBarrier, ctx: &CrawlContext, grace: Duration) -> bool {
    loop {
        let finished = ctx.finished.load(Ordering::Acquire);
        if barrier.wait_timeout(grace).await {
            return true;
        }
        if ctx.finished.load(Ordering::Acquire) == finished {
            return false;
        }
    }
}

/// Depth-first crawl on an explicit work stack
///
/// Links are pushed in reverse so pops follow extraction order.
async fn crawl_sequential(ctx: &CrawlContext, seed: &str, depth: i32) {
    let mut stack: Vec<(String, i32)> = vec![(seed.to_string(), depth)];

    while let Some((raw, depth)) = stack.pop() {
        if depth <= 0 {
            continue;
        }

        let url = match canonicalize(&raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Skipping URL: {}", e);
                continue;
            }
        };

        if !ctx.policy.url_in_domain(&url) {
            tracing::debug!("Skipping cross-domain URL {}", url);
            continue;
        }

        if !ctx.frontier.try_reserve(url.as_str()) {
            continue;
        }

        let links = ctx.process_page(&url).await;
        for link in links.into_iter().rev() {
            stack.push((link.to_string(), depth - 1));
        }
    }
}

/// Registers a job with the barrier and hands it to the pool
///
/// The URL must already be reserved. The job's barrier party is released
/// when the job finishes, panics, or is rejected by the pool.
fn submit_page(
    ctx: &Arc<CrawlContext>,
    pool: &Arc<WorkerPool>,
    barrier: &Arc<JoinBarrier>,
    url: Url,
    depth: i32,
) {
    barrier.register();
    let guard = BarrierGuard::new(Arc::clone(barrier));

    let job_ctx = Arc::clone(ctx);
    let job_pool = Arc::clone(pool);
    let job_barrier = Arc::clone(barrier);
    let job_url = url.clone();

    let job = Box::pin(async move {
        let _guard = guard;
        let links = job_ctx.process_page(&job_url).await;

        if depth - 1 > 0 {
            for link in links {
                if job_ctx.frontier.try_reserve(link.as_str()) {
                    submit_page(&job_ctx, &job_pool, &job_barrier, link, depth - 1);
                }
            }
        }
    });

    if let Err(e) = pool.submit(job) {
        tracing::warn!("Dropping {}: {}", url, e);
    }
}
