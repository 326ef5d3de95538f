use crate::util::{ensure_public_host, validate_url, UrlValidationError};
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;

/// Identifying User-Agent sent with every outbound request.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; RSS Redirect Resolver/1.0)";

/// Upper bound for a single redirect probe, redirects included.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REDIRECTS: usize = 10;

/// Why a redirect probe did not reach a terminal URL.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe did not finish within its time bound
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    /// DNS, connection, TLS or redirect-policy failure
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// The chain ended on a non-2xx response
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// The URL failed validation before any request was made
    #[error("Refusing to resolve URL: {0}")]
    Rejected(#[from] UrlValidationError),
}

/// Follows live HTTP redirect chains with a `HEAD` probe.
///
/// Cheap to clone: the underlying `reqwest::Client` shares its connection pool
/// between clones, so one resolver can be handed to every fan-out task.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    client: reqwest::Client,
    timeout: Duration,
    allow_private_hosts: bool,
}

impl RedirectResolver {
    /// Builds a resolver with its own HTTP client.
    ///
    /// With `allow_private_hosts` unset, URLs and redirect hops pointing at
    /// localhost or private address space are refused.
    pub fn new(allow_private_hosts: bool) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(create_redirect_policy(allow_private_hosts))
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(PROBE_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            timeout: PROBE_TIMEOUT,
            allow_private_hosts,
        })
    }

    /// The shared HTTP client, also used for fetching feeds.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn allows_private_hosts(&self) -> bool {
        self.allow_private_hosts
    }

    #[cfg(test)]
    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the terminal URL reached from `url`, or `url` itself when the
    /// probe fails for any reason.
    pub async fn follow_redirects(&self, url: &str) -> String {
        match self.probe(url).await {
            Ok(terminal) => terminal,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Redirect probe failed, keeping input URL");
                url.to_owned()
            }
        }
    }

    /// Probes `url` and reports the terminal URL or the reason it was not reached.
    ///
    /// The request future is dropped once the time bound elapses, which
    /// cancels the in-flight request; the client-level timeout is a second
    /// line behind it.
    pub async fn probe(&self, url: &str) -> Result<String, ProbeError> {
        let target = validate_url(url, self.allow_private_hosts)?;

        let request = self.client.head(target).timeout(self.timeout);
        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout(self.timeout)
                } else {
                    ProbeError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::HttpStatus(status.as_u16()));
        }

        let terminal = response.url().to_string();
        tracing::debug!(from = %url, to = %terminal, status = %status, "Redirect chain resolved");
        Ok(terminal)
    }
}

/// Redirect policy with a hop limit, loop detection and, unless private hosts
/// are allowed, the SSRF guard applied to every hop.
fn create_redirect_policy(allow_private_hosts: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error(format!("Too many redirects (max {MAX_REDIRECTS})"));
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        if !matches!(url.scheme(), "http" | "https") {
            let scheme = url.scheme().to_owned();
            return attempt.error(UrlValidationError::UnsupportedScheme(scheme));
        }

        if !allow_private_hosts {
            if let Err(e) = ensure_public_host(url) {
                return attempt.error(e);
            }
        }

        tracing::trace!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len(),
            "Following redirect"
        );

        attempt.follow()
    })
}
