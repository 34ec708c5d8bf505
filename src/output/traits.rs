//! Output sink traits and types
//!
//! This module defines the trait interface for page sinks and the error
//! type shared by every output operation.

use parking_lot::Mutex;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for page sinks
///
/// A sink persists the content of each fetched page and names the
/// resulting document. Implementations must be thread-safe; concurrent
/// crawls store pages from many workers at once.
pub trait PageSink: Send + Sync {
    /// Stores a fetched page
    ///
    /// # Arguments
    ///
    /// * `url` - The canonical page URL
    /// * `content` - The page body
    ///
    /// # Returns
    ///
    /// The document name under which the page was stored
    fn store(&self, url: &str, content: &str) -> OutputResult<String>;
}

/// Page sink that keeps every page in memory
///
/// Documents are named by their URL.
#[derive(Debug, Default)]
pub struct MemoryPageSink {
    pages: Mutex<Vec<(String, String)>>,
}

impl MemoryPageSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(document name, content)` pairs in storage order
    pub fn pages(&self) -> Vec<(String, String)> {
        self.pages.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.pages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.lock().is_empty()
    }
}

impl PageSink for MemoryPageSink {
    fn store(&self, url: &str, content: &str) -> OutputResult<String> {
        self.pages
            .lock()
            .push((url.to_string(), content.to_string()));
        Ok(url.to_string())
    }
}
