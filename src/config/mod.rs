//! Configuration module for Site-Sift
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys are optional; the built-in defaults reproduce a plain
//! `site-sift <seed>` run.
//!
//! # Example
//!
//! ```no_run
//! use site_sift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site-sift.toml")).unwrap();
//! println!("Crawler will admit at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_USER_AGENT, MAX_PAGES,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
