use serde::Deserialize;
use std::time::Duration;

/// Default global page budget for one crawl run
pub const MAX_PAGES: usize = 200;

/// Browser-like user agent sent with every page request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Main configuration structure for Site-Sift
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages admitted in one crawl run
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Worker pool size for concurrent crawls (0 = twice the available parallelism)
    pub workers: usize,

    /// How long to wait for in-flight work after the crawl quiesces (seconds)
    #[serde(rename = "shutdown-grace-secs")]
    pub shutdown_grace_secs: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: MAX_PAGES,
            workers: 0,
            shutdown_grace_secs: 60,
            request_timeout_secs: 30,
            connect_timeout_secs: 15,
            max_redirects: 10,
        }
    }
}

impl CrawlerConfig {
    /// Resolves the worker pool size, deriving it from the host when unset
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }

        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        (cpus * 2).max(2)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base directory for stored pages and index runs
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Number of ranked results written to the query report
    #[serde(rename = "top-k")]
    pub top_k: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            top_k: 10,
        }
    }
}
