use crate::feed::parser::{parse_feed, ParsedFeed};
use crate::util::{validate_url, UrlValidationError};
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

const FEED_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that prevent a feed's item list from being obtained.
///
/// Any of these turns the whole feed request into an unsuccessful
/// `FeedResult`; per-item failures never surface here.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Feed URL failed validation (scheme or SSRF guard)
    #[error("Invalid feed URL: {0}")]
    Rejected(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, redirect policy)
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the 10-second timeout
    #[error("Request timed out")]
    Timeout,
    /// Body could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Received fewer bytes than Content-Length announced
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Fetches and parses the feed at `url`.
///
/// A single attempt is made: no retry on rate limiting, server errors or
/// truncated bodies. The client's redirect policy applies to the fetch.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    allow_private_hosts: bool,
) -> Result<ParsedFeed, FeedError> {
    let target = validate_url(url, allow_private_hosts)?;

    let response = tokio::time::timeout(FEED_TIMEOUT, client.get(target).send())
        .await
        .map_err(|_| FeedError::Timeout)?
        .map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout
            } else {
                FeedError::Network(e)
            }
        })?;

    if !response.status().is_success() {
        return Err(FeedError::HttpStatus(response.status().as_u16()));
    }

    let bytes = tokio::time::timeout(FEED_TIMEOUT, read_limited_bytes(response, MAX_FEED_SIZE))
        .await
        .map_err(|_| FeedError::Timeout)??;

    let feed = parse_feed(&bytes).map_err(|e| FeedError::Parse(e.to_string()))?;

    tracing::debug!(
        feed = %url,
        bytes = bytes.len(),
        items = feed.items.len(),
        "Fetched feed"
    );

    Ok(feed)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FeedError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FeedError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FeedError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FeedError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FeedError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
