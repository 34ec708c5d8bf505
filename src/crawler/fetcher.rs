//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests to fetch page content
//! - Redirect handling (delegated to reqwest, bounded hop count)
//! - Error classification
//!
//! A failed fetch is never an error for the crawl: it yields empty content
//! and the page becomes a leaf.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::fmt;
use std::time::Duration;

/// Retrieves the body of a page
///
/// An empty string means "nothing to index, follow no links".
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> String;
}

/// Reason a fetch produced no content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Non-2xx response after redirects
    Status(u16),

    /// Response was not `text/html`
    ContentType(String),

    /// Connection, TLS, timeout or redirect failure
    Transport(String),

    /// The body could not be read
    Body(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP status {}", code),
            Self::ContentType(ct) => write!(f, "content type '{}' is not text/html", ct),
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::Body(e) => write!(f, "failed to read body: {}", e),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent, timeouts, redirect limit)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_sift::config::Config;
/// use site_sift::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.value.clone())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
        .redirect(Policy::limited(config.crawler.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from the configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a URL, classifying every way it can fail
    ///
    /// # Request Flow
    ///
    /// 1. Send GET request (redirects followed by the client)
    /// 2. Non-2xx final status → `Status`
    /// 3. Content-Type without `text/html` → `ContentType`
    /// 4. Read the body as text
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The page body
    /// * `Err(FetchFailure)` - Why no content is available
    pub async fn try_fetch(&self, url: &str) -> Result<String, FetchFailure> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchFailure::Transport("request timeout".to_string())
            } else if e.is_connect() {
                FetchFailure::Transport("connection failed".to_string())
            } else {
                FetchFailure::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.to_lowercase().contains("text/html") {
            return Err(FetchFailure::ContentType(content_type));
        }

        response
            .text()
            .await
            .map_err(|e| FetchFailure::Body(e.to_string()))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> String {
        match self.try_fetch(url).await {
            Ok(body) => body,
            Err(failure @ FetchFailure::ContentType(_)) => {
                tracing::debug!("Skipping {}: {}", url, failure);
                String::new()
            }
            Err(failure) => {
                tracing::warn!("Failed to fetch {}: {}", url, failure);
                String::new()
            }
        }
    }
}
