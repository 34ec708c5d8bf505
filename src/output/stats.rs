//! End-of-run statistics

use crate::crawler::{CrawlMode, CrawlReport};
use crate::index::InvertedIndex;
use std::time::Duration;

/// Summary statistics for a crawl, index and query run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSummary {
    pub mode: CrawlMode,
    pub elapsed: Duration,
    pub pages_admitted: usize,
    pub pages_stored: usize,
    pub discovered_hosts: usize,
    pub documents: usize,
    pub indexed_terms: usize,
    pub abandoned: bool,
}

impl CrawlSummary {
    /// Combines the crawl report with the index built from its pages
    pub fn new(report: &CrawlReport, index: &InvertedIndex) -> Self {
        Self {
            mode: report.mode,
            elapsed: report.elapsed,
            pages_admitted: report.pages_admitted,
            pages_stored: report.pages_stored,
            discovered_hosts: report.discovered_hosts.len(),
            documents: index.total_documents(),
            indexed_terms: index.len(),
            abandoned: report.abandoned,
        }
    }

    /// Pages crawled per second of wall-clock time
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.pages_admitted as f64 / secs
    }

    /// Percentage of admitted pages that were fetched and stored
    pub fn store_rate(&self) -> f64 {
        if self.pages_admitted == 0 {
            return 0.0;
        }
        (self.pages_stored as f64 / self.pages_admitted as f64) * 100.0
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Statistics ===\n");

    println!("Crawl:");
    println!("  Mode: {}", summary.mode);
    println!("  Elapsed: {:.2}s", summary.elapsed.as_secs_f64());
    println!("  Pages admitted: {}", summary.pages_admitted);
    println!(
        "  Pages stored: {} ({:.1}%)",
        summary.pages_stored,
        summary.store_rate()
    );
    println!("  Discovered hosts: {}", summary.discovered_hosts);
    println!("  Rate: {:.2} pages/sec", summary.pages_per_second());
    if summary.abandoned {
        println!("  Note: shutdown grace period expired; remaining work was abandoned");
    }
    println!();

    println!("Index:");
    println!("  Documents: {}", summary.documents);
    println!("  Terms: {}", summary.indexed_terms);
}
