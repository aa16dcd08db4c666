//! Prowl: a product page discovery crawler
//!
//! This crate follows hyperlinks from a seed URL up to a bounded depth, fetching
//! pages concurrently under a fixed admission limit, and reports every visited URL
//! that matches one of the configured product URL patterns.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Prowl operations
#[derive(Debug, Error)]
pub enum ProwlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors produced by a single crawl task
///
/// A task error terminates only the branch of the traversal rooted at the URL
/// that produced it. The messages are kept as strings so that results can be
/// cloned and serialized after the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    /// The URL could not be turned into a request
    #[error("Error creating request for {url}: {message}")]
    RequestBuild { url: String, message: String },

    /// The request could not complete (connection failure, timeout, ...)
    #[error("Error fetching {url}: {message}")]
    Transport { url: String, message: String },

    /// The server answered with anything other than 200 OK
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    /// The document body could not be read as HTML
    #[error("Error parsing HTML for {url}: {message}")]
    Parse { url: String, message: String },

    /// The run's cancellation signal was observed
    #[error("crawl cancelled")]
    Cancelled,
}

impl CrawlError {
    /// Returns true if this error was caused by run cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// Results carry errors as their display text
impl serde::Serialize for CrawlError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result type alias for Prowl operations
pub type Result<T> = std::result::Result<T, ProwlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, CrawlerConfig};
pub use crawler::{CrawlResult, Crawler, Product};
pub use state::TaskState;
pub use url::{is_product_url, resolve_url};
