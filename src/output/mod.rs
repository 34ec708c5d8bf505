//! Output module for persisting crawl results and reports
//!
//! This module handles:
//! - Storing fetched pages (filesystem or memory sinks)
//! - Exporting discovered hosts and the inverted index
//! - Reading stored pages back for indexing
//! - Writing the last-query report and end-of-run statistics

mod files;
mod report;
pub mod stats;
mod traits;

pub use files::{
    backup_existing, format_index_line, load_pages, page_file_stem, save_hosts, save_index,
    write_atomic, FsPageSink, PageStore, TIMESTAMP_FORMAT,
};
pub use report::{format_search_report, write_search_report, SEARCH_REPORT_FILE};
pub use stats::{print_summary, CrawlSummary};
pub use traits::{MemoryPageSink, OutputError, OutputResult, PageSink};
