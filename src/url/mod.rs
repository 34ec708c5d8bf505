//! URL handling module for Site-Sift
//!
//! This module provides URL canonicalization, host extraction, the
//! same-domain policy that scopes a crawl, and the non-HTML resource filter.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, strip_www, DomainPolicy};
pub use filter::{is_crawlable_resource, is_non_html_resource};
pub use normalize::canonicalize;
