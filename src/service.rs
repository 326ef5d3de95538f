//! Request validation and dispatch between single-URL and feed resolution.
//!
//! Client-input problems are rejected here, before any resolution work starts,
//! as [`RequestError`]. Everything past validation produces a well-formed
//! response object, even when resolution fails.

use crate::feed::fetch_feed;
use crate::resolve::{
    resolve_feed, resolve_single, FeedResult, RedirectResolver, ResolutionOutcome,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Incoming request: `{"url": "...", "type": "single" | "feed"}`.
///
/// Both fields are optional at the type level so missing values can be
/// reported with their own messages instead of a generic decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveRequest {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ResolveRequest {
    pub fn new(url: impl Into<String>, kind: RequestKind) -> Self {
        Self {
            url: Some(url.into()),
            kind: Some(kind.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Single,
    Feed,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Single => "single",
            RequestKind::Feed => "feed",
        }
    }
}

impl FromStr for RequestKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(RequestKind::Single),
            "feed" => Ok(RequestKind::Feed),
            _ => Err(RequestError::InvalidType),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResolveResponse {
    Single(ResolutionOutcome),
    Feed(FeedResult),
}

/// Client-input errors, distinct from resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("URL is required")]
    MissingUrl,
    #[error("Invalid URL format")]
    InvalidUrl,
    #[error("Type must be \"single\" or \"feed\"")]
    InvalidType,
}

/// Entry point shared by the CLI and the HTTP server.
#[derive(Debug, Clone)]
pub struct Service {
    resolver: RedirectResolver,
}

impl Service {
    pub fn new(resolver: RedirectResolver) -> Self {
        Self { resolver }
    }

    /// Validates `request` and dispatches it.
    ///
    /// # Errors
    ///
    /// - [`RequestError::MissingUrl`] - `url` absent or blank
    /// - [`RequestError::InvalidUrl`] - `url` is not an absolute URL
    /// - [`RequestError::InvalidType`] - `type` absent or not `single`/`feed`
    pub async fn handle(&self, request: ResolveRequest) -> Result<ResolveResponse, RequestError> {
        let url = request
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(RequestError::MissingUrl)?;

        Url::parse(url).map_err(|_| RequestError::InvalidUrl)?;

        let kind: RequestKind = request
            .kind
            .as_deref()
            .ok_or(RequestError::InvalidType)?
            .parse()?;

        tracing::info!(url = %url, kind = kind.as_str(), "Resolve request");

        let response = match kind {
            RequestKind::Single => ResolveResponse::Single(self.resolve_url(url).await),
            RequestKind::Feed => ResolveResponse::Feed(self.resolve_feed_url(url).await),
        };
        Ok(response)
    }

    /// Resolves one URL through the decode-then-probe pipeline.
    pub async fn resolve_url(&self, url: &str) -> ResolutionOutcome {
        resolve_single(&self.resolver, url).await
    }

    /// Fetches the feed at `url` and resolves its items.
    ///
    /// Failure to fetch or parse the feed yields an unsuccessful
    /// [`FeedResult`] with no items.
    pub async fn resolve_feed_url(&self, url: &str) -> FeedResult {
        let feed = match fetch_feed(
            self.resolver.client(),
            url,
            self.resolver.allows_private_hosts(),
        )
        .await
        {
            Ok(feed) => feed,
            Err(e) => {
                tracing::warn!(feed = %url, error = %e, "Failed to retrieve feed");
                return FeedResult::failed(e.to_string());
            }
        };

        resolve_feed(&self.resolver, feed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> Service {
        Service::new(RedirectResolver::new(false).unwrap())
    }

    fn request(url: Option<&str>, kind: Option<&str>) -> ResolveRequest {
        ResolveRequest {
            url: url.map(str::to_owned),
            kind: kind.map(str::to_owned),
        }
    }

    #[test]
    fn test_request_kind_parsing() {
        assert_eq!("single".parse::<RequestKind>(), Ok(RequestKind::Single));
        assert_eq!("feed".parse::<RequestKind>(), Ok(RequestKind::Feed));
        assert_eq!("Feed".parse::<RequestKind>(), Err(RequestError::InvalidType));
    }

    #[test]
    fn test_request_deserializes_type_field() {
        let req: ResolveRequest =
            serde_json::from_str(r#"{"url":"https://example.com","type":"feed"}"#).unwrap();
        assert_eq!(req.url.as_deref(), Some("https://example.com"));
        assert_eq!(req.kind.as_deref(), Some("feed"));

        let empty: ResolveRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.url.is_none() && empty.kind.is_none());
    }

    #[tokio::test]
    async fn test_missing_url_rejected() {
        let svc = service();
        assert_eq!(
            svc.handle(request(None, Some("single"))).await,
            Err(RequestError::MissingUrl)
        );
        assert_eq!(
            svc.handle(request(Some("   "), Some("single"))).await,
            Err(RequestError::MissingUrl)
        );
    }

    #[tokio::test]
    async fn test_malformed_url_rejected() {
        assert_eq!(
            service()
                .handle(request(Some("example.com/no-scheme"), Some("single")))
                .await,
            Err(RequestError::InvalidUrl)
        );
    }

    #[tokio::test]
    async fn test_invalid_type_rejected() {
        let svc = service();
        assert_eq!(
            svc.handle(request(Some("https://example.com"), Some("batch")))
                .await,
            Err(RequestError::InvalidType)
        );
        assert_eq!(
            svc.handle(request(Some("https://example.com"), None)).await,
            Err(RequestError::InvalidType)
        );
    }

    #[tokio::test]
    async fn test_url_checked_before_type() {
        assert_eq!(
            service().handle(request(None, Some("bogus"))).await,
            Err(RequestError::MissingUrl)
        );
    }

    #[test]
    fn test_error_messages_are_distinct() {
        let messages = [
            RequestError::MissingUrl.to_string(),
            RequestError::InvalidUrl.to_string(),
            RequestError::InvalidType.to_string(),
        ];
        assert_eq!(messages[0], "URL is required");
        assert_eq!(messages[1], "Invalid URL format");
        assert_eq!(messages[2], r#"Type must be "single" or "feed""#);
    }

    #[tokio::test]
    async fn test_single_plain_url_resolves_offline() {
        let response = service()
            .handle(ResolveRequest::new(
                "https://example.com/story",
                RequestKind::Single,
            ))
            .await
            .unwrap();

        assert_eq!(
            response,
            ResolveResponse::Single(ResolutionOutcome::unchanged("https://example.com/story"))
        );
    }

    #[tokio::test]
    async fn test_blocked_feed_url_is_failed_result() {
        let response = service()
            .handle(ResolveRequest::new("http://192.168.1.20/rss", RequestKind::Feed))
            .await
            .unwrap();

        match response {
            ResolveResponse::Feed(result) => {
                assert!(!result.success);
                assert!(result.items.is_empty());
                assert!(result.error.is_some());
            }
            other => panic!("Expected feed response, got {:?}", other),
        }
    }
}
