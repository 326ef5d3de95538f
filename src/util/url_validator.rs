use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation.
///
/// Covers parsing failures and the SSRF policy applied before the resolver
/// contacts a host on a caller's behalf.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL points to a private/internal IP address.
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    /// The URL points to localhost.
    #[error("Localhost not allowed")]
    Localhost,
}

/// Parses `url_str` and requires an `http` or `https` scheme.
pub fn parse_http_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Rejects URLs whose host is localhost, loopback, private, link-local or
/// unspecified.
///
/// Hostnames are not resolved; only literal IP hosts and `localhost` are
/// checked.
pub fn ensure_public_host(url: &Url) -> Result<(), UrlValidationError> {
    let Some(host) = url.host_str() else {
        return Ok(());
    };

    if host.eq_ignore_ascii_case("localhost") {
        return Err(UrlValidationError::Localhost);
    }

    // IPv6 hosts come back bracketed from host_str()
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    if let Ok(ip) = bare.parse::<IpAddr>() {
        if ip.is_loopback() {
            return Err(UrlValidationError::Localhost);
        }
        if is_private_ip(&ip) {
            return Err(UrlValidationError::PrivateIp(ip.to_string()));
        }
    }

    Ok(())
}

/// Validates a URL before the resolver makes an outbound request to it.
///
/// The scheme must be `http`/`https`. Unless `allow_private_hosts` is set, the
/// host must also pass [`ensure_public_host`].
///
/// # Examples
///
/// ```
/// use rss_resolver::util::validate_url;
///
/// assert!(validate_url("https://example.com/story", false).is_ok());
/// assert!(validate_url("http://192.168.1.1/feed", false).is_err());
/// assert!(validate_url("http://127.0.0.1:8080/feed", true).is_ok());
/// assert!(validate_url("file:///etc/passwd", true).is_err());
/// ```
pub fn validate_url(url_str: &str, allow_private_hosts: bool) -> Result<Url, UrlValidationError> {
    let url = parse_http_url(url_str)?;
    if !allow_private_hosts {
        ensure_public_host(&url)?;
    }
    Ok(url)
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_private() || ipv4.is_loopback() || ipv4.is_link_local() || ipv4.is_unspecified()
        }
        IpAddr::V6(ipv6) => {
            if ipv6.is_loopback() || ipv6.is_unspecified() {
                return true;
            }
            let segments = ipv6.segments();
            // fc00::/7
            let is_unique_local = (segments[0] & 0xfe00) == 0xfc00;
            // fe80::/10
            let is_link_local = (segments[0] & 0xffc0) == 0xfe80;
            is_unique_local || is_link_local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_urls_accepted() {
        assert!(validate_url("https://example.com/article", false).is_ok());
        assert!(validate_url("http://news.example.org:8080/a?b=c", false).is_ok());
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        assert!(matches!(
            validate_url("ftp://example.com", true),
            Err(UrlValidationError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(validate_url("javascript:alert(1)", true).is_err());
    }

    #[test]
    fn test_unparseable_rejected() {
        assert!(matches!(
            validate_url("not a url", true),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_localhost_variants_rejected() {
        assert!(matches!(
            validate_url("http://localhost/x", false),
            Err(UrlValidationError::Localhost)
        ));
        assert!(matches!(
            validate_url("http://LOCALHOST/x", false),
            Err(UrlValidationError::Localhost)
        ));
        assert!(matches!(
            validate_url("http://127.0.0.1/x", false),
            Err(UrlValidationError::Localhost)
        ));
        assert!(matches!(
            validate_url("http://[::1]/x", false),
            Err(UrlValidationError::Localhost)
        ));
    }

    #[test]
    fn test_private_ranges_rejected() {
        for url in [
            "http://10.0.0.1/",
            "http://172.16.0.1/",
            "http://192.168.1.1:3000/",
            "http://169.254.169.254/latest/meta-data",
            "http://0.0.0.0/",
            "http://[fe80::1]/",
            "http://[fd00::1]/",
        ] {
            assert!(
                matches!(validate_url(url, false), Err(UrlValidationError::PrivateIp(_))),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_private_hosts_allowed_when_opted_in() {
        assert!(validate_url("http://127.0.0.1:4000/feed", true).is_ok());
        assert!(validate_url("http://10.1.2.3/feed", true).is_ok());
    }
}
