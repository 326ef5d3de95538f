//! Offline link decoding.
//!
//! Two strategies are tried in order:
//!
//! 1. Google News article links (`https://news.google.com/rss/articles/<token>`)
//!    carry the target URL inside a base64 token. The format is undocumented,
//!    so decoding is a heuristic: decode the token and look for the first
//!    embedded `http(s)://` URL in the bytes.
//! 2. Google redirect wrappers (`https://www.google.com/url?url=...` or `?q=...`)
//!    carry the target in a query parameter.
//!
//! Anything else, and any failure along the way, yields the input unchanged.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use regex::bytes::Regex;
use std::sync::OnceLock;
use url::Url;

const ARTICLE_HOST: &str = "news.google.com";
const ARTICLE_MARKER: &str = "/articles/";
const REDIRECT_DOMAIN: &str = "google.com";
const REDIRECT_PATH: &str = "/url";

/// Standard alphabet with optional padding and tolerated trailing bits.
/// URL-safe tokens are mapped onto it before decoding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

static EMBEDDED_URL: OnceLock<Regex> = OnceLock::new();

fn embedded_url_pattern() -> &'static Regex {
    // Unicode-aware byte regex: the negated class only matches valid UTF-8,
    // so the match stops at the first binary byte after the URL.
    EMBEDDED_URL.get_or_init(|| {
        Regex::new(r#"https?://[^\s"'<>\p{Cc}]+"#).expect("embedded URL pattern is valid")
    })
}

/// Returns the best-effort decoded target of `url`, or `url` itself.
///
/// Never fails: malformed input, undecodable tokens and tokens without an
/// embedded URL all fall through to returning the input unchanged.
///
/// # Examples
///
/// ```
/// use rss_resolver::resolve::decode;
///
/// assert_eq!(
///     decode("https://www.google.com/url?q=https://example.com/b&sa=U"),
///     "https://example.com/b"
/// );
/// assert_eq!(decode("https://example.com/plain"), "https://example.com/plain");
/// assert_eq!(decode("not even a url"), "not even a url");
/// ```
pub fn decode(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_owned();
    };

    if let Some(target) = decode_news_article(&parsed) {
        tracing::debug!(from = %url, to = %target, "Decoded Google News article link");
        return target;
    }

    if let Some(target) = unwrap_redirect(&parsed) {
        tracing::debug!(from = %url, to = %target, "Unwrapped Google redirect link");
        return target;
    }

    url.to_owned()
}

fn decode_news_article(url: &Url) -> Option<String> {
    if url.host_str() != Some(ARTICLE_HOST) {
        return None;
    }

    let path = url.path();
    let start = path.find(ARTICLE_MARKER)? + ARTICLE_MARKER.len();
    let token = &path[start..];
    if token.is_empty() {
        return None;
    }

    let Some(bytes) = decode_token(token) else {
        tracing::trace!(token = %token, "Article token is not base64");
        return None;
    };

    find_embedded_url(&bytes)
}

/// Decodes a base64 token written in either alphabet, with or without padding.
fn decode_token(token: &str) -> Option<Vec<u8>> {
    let mut normalized: String = token
        .chars()
        .filter(|c| *c != '=' && !c.is_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    // A lone trailing sextet cannot encode a byte
    if normalized.len() % 4 == 1 {
        normalized.pop();
    }

    LENIENT_BASE64.decode(normalized.as_bytes()).ok()
}

fn find_embedded_url(bytes: &[u8]) -> Option<String> {
    let found = embedded_url_pattern().find(bytes)?;
    let candidate = std::str::from_utf8(found.as_bytes()).ok()?;

    let parsed = Url::parse(candidate).ok()?;
    parsed.host_str()?;

    Some(candidate.to_owned())
}

fn unwrap_redirect(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let on_google = host == REDIRECT_DOMAIN
        || host
            .strip_suffix(REDIRECT_DOMAIN)
            .is_some_and(|prefix| prefix.ends_with('.'));
    if !on_google || url.path() != REDIRECT_PATH {
        return None;
    }

    let mut url_param = None;
    let mut q_param = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "url" if url_param.is_none() => url_param = Some(value.into_owned()),
            "q" if q_param.is_none() => q_param = Some(value.into_owned()),
            _ => {}
        }
    }

    url_param
        .filter(|v| !v.is_empty())
        .or_else(|| q_param.filter(|v| !v.is_empty()))
}
