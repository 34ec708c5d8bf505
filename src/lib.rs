//! Site-Sift: a single-domain site search pipeline
//!
//! This crate crawls one web domain from a seed URL, builds a term to document
//! inverted index from the fetched pages, and ranks documents against a
//! free-text query with TF-IDF.

pub mod config;
pub mod crawler;
pub mod index;
pub mod output;
pub mod search;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Sift operations
#[derive(Debug, Error)]
pub enum SiteSearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL {url}: {source}")]
    InvalidSeed { url: String, source: UrlError },

    #[error("Worker pool failed to start: {0}")]
    PoolStart(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Malformed URL: {0}")]
    Malformed(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Site-Sift operations
pub type Result<T> = std::result::Result<T, SiteSearchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlMode, CrawlReport};
pub use index::InvertedIndex;
pub use search::rank;
pub use state::CrawlState;
pub use crate::url::{canonicalize, DomainPolicy};
