//! Small helpers shared by the resolver, the feed fetcher and the service boundary.
//!
//! - **URL validation**: scheme checks and an SSRF guard for outbound requests
//! - **Text cleanup**: normalising feed-supplied titles and descriptions

mod text;
mod url_validator;

pub use text::clean_text;
pub use url_validator::{ensure_public_host, parse_http_url, validate_url, UrlValidationError};
