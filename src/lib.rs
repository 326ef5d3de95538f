//! Resolves Google News article links and redirect wrappers to the URLs they
//! point at, for single links or for every item of an RSS/Atom feed.
//!
//! # Example
//!
//! ```no_run
//! use rss_resolver::resolve::RedirectResolver;
//! use rss_resolver::service::Service;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let service = Service::new(RedirectResolver::new(false)?);
//!
//! let outcome = service
//!     .resolve_url("https://news.google.com/rss/articles/CBMi...?oc=5")
//!     .await;
//! println!("{} -> {}", outcome.original, outcome.resolved);
//!
//! let feed = service
//!     .resolve_feed_url("https://news.google.com/rss?hl=en-US")
//!     .await;
//! println!("{} items", feed.items.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod feed;
pub mod resolve;
pub mod server;
pub mod service;
pub mod util;
