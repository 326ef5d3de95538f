//! Feed retrieval for the fan-out stage.
//!
//! - [`parser`] - adapts `feed-rs` output (RSS 0.9x/1.0/2.0, Atom, JSON Feed)
//!   into [`ParsedFeed`]
//! - [`fetcher`] - single-attempt, size- and time-bounded HTTP retrieval

mod fetcher;
mod parser;

pub use fetcher::{fetch_feed, FeedError};
pub use parser::{parse_feed, ParsedFeed};
