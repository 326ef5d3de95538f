//! URL resolution core.
//!
//! - [`decoder`] - offline decoding of Google News and Google redirect links
//! - [`redirect`] - live `HEAD` probes that follow redirect chains
//! - [`pipeline`] - decode-then-probe for a single URL
//! - [`fanout`] - concurrent resolution of a feed's items
//!
//! Every stage degrades to its input instead of failing: callers always get a
//! well-formed [`ResolutionOutcome`] or [`FeedResult`] back.

mod decoder;
mod fanout;
mod pipeline;
mod redirect;
mod types;

pub use decoder::decode;
pub use fanout::{resolve_feed, resolve_items, MAX_FEED_ITEMS};
pub use pipeline::resolve_single;
pub use redirect::{ProbeError, RedirectResolver, PROBE_TIMEOUT, USER_AGENT};
pub use types::{FeedItem, FeedItemOutcome, FeedResult, ResolutionOutcome};
