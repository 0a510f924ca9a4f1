//! Outbound HTTP fetch
//!
//! Every network call made by the resolvers and the metadata client goes
//! through the [`Fetcher`] trait. The production implementation sends
//! browser-like headers and carries a bounded timeout, so a stalled upstream
//! can never hold an aggregation open.

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Browser User-Agent; the scraped sites serve reduced markup to bots
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

const REFERER: &str = "https://www.google.com/";

/// Fetch failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned status {0}")]
    Status(u16),
}

/// Text fetch over HTTP GET
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return the body as text
    ///
    /// # Errors
    /// Timeout, connection failure, or any non-2xx status.
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher with shared connection pool
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher whose every request is bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static(ACCEPT_LANGUAGE),
        );
        headers.insert(header::REFERER, header::HeaderValue::from_static(REFERER));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Upstream returned non-success status");
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(classify)
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    // Strip the URL: metadata/ratings URLs carry API keys in the query string
    let err = err.without_url();
    if err.is_timeout() {
        FetchError::Timeout(err.to_string())
    } else {
        FetchError::Transport(err.to_string())
    }
}

// ============================================================================
// Mock Fetcher for Testing
// ============================================================================
