//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with the identifying user agent
//! - Issuing a single GET per page, bounded by the request timeout
//! - Classifying failures into request, transport, status and parse errors
//!
//! There are no retries. Redirects are followed only as far as the client's
//! default policy does.

use crate::config::CrawlerConfig;
use crate::CrawlError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;

/// Source of page documents for the scheduler
///
/// The scheduler only ever talks to this trait, so a run can be driven by the
/// real HTTP client or by an in-memory site in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the document at `url`
    ///
    /// Implementations must return `CrawlError::Cancelled` promptly once `cancel`
    /// fires, and must treat anything other than a complete 200 response as an error.
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>, CrawlError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent and request timeout)
///
/// # Example
///
/// ```no_run
/// use prowl::config::CrawlerConfig;
/// use prowl::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>, CrawlError> {
        let request = self
            .client
            .get(url)
            .build()
            .map_err(|e| CrawlError::RequestBuild {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let sent = tokio::select! {
            _ = cancel.cancelled() => return Err(CrawlError::Cancelled),
            sent = self.client.execute(request) => sent,
        };
        let response = sent.map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!("Non-200 status for {}: {}", url, status.as_u16());
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Reading the byte stream is the first half of parsing the document
        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(CrawlError::Cancelled),
            body = response.bytes() => body,
        };

        body.map(|bytes| bytes.to_vec())
            .map_err(|e| CrawlError::Parse {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

/// Classifies a failed request
fn transport_error(url: &str, error: &reqwest::Error) -> CrawlError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };

    CrawlError::Transport {
        url: url.to_string(),
        message,
    }
}
