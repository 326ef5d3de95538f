use super::pipeline::resolve_single;
use super::redirect::RedirectResolver;
use super::types::{FeedItem, FeedItemOutcome, FeedResult, ResolutionOutcome};
use crate::feed::ParsedFeed;
use futures::future::join_all;

/// Maximum number of feed items resolved per request. Later items are dropped.
pub const MAX_FEED_ITEMS: usize = 50;

/// Resolves the links of up to [`MAX_FEED_ITEMS`] items concurrently.
///
/// Every item gets its own task, so a slow probe only delays its own slot and
/// a panicking task is recorded as a failed outcome instead of taking its
/// siblings down. Handles are awaited in spawn order, so the returned vector
/// lines up index-for-index with the (truncated) input regardless of which
/// task finished first.
pub async fn resolve_items(resolver: &RedirectResolver, items: Vec<FeedItem>) -> Vec<FeedItemOutcome> {
    let total = items.len();
    if total > MAX_FEED_ITEMS {
        tracing::debug!(
            total = total,
            kept = MAX_FEED_ITEMS,
            "Feed exceeds item limit, dropping trailing items"
        );
    }

    let mut metadata = Vec::with_capacity(total.min(MAX_FEED_ITEMS));
    let mut handles = Vec::with_capacity(total.min(MAX_FEED_ITEMS));

    for item in items.into_iter().take(MAX_FEED_ITEMS) {
        let FeedItem {
            title,
            publication_date,
            link,
        } = item;

        let resolver = resolver.clone();
        let task_link = link.clone();
        handles.push(tokio::spawn(async move {
            resolve_single(&resolver, &task_link).await
        }));
        metadata.push((title, publication_date, link));
    }

    let joined = join_all(handles).await;

    joined
        .into_iter()
        .zip(metadata)
        .map(|(joined, (title, publication_date, link))| {
            let outcome = joined.unwrap_or_else(|e| {
                tracing::error!(link = %link, error = %e, "Resolution task aborted");
                ResolutionOutcome::failed(link, format!("Resolution task failed: {e}"))
            });
            FeedItemOutcome {
                title,
                publication_date,
                outcome,
            }
        })
        .collect()
}

/// Resolves every item of an already-parsed feed.
///
/// Individual item failures are recorded per item; the result itself is
/// always successful.
pub async fn resolve_feed(resolver: &RedirectResolver, feed: ParsedFeed) -> FeedResult {
    let items = resolve_items(resolver, feed.items).await;

    let failed = items.iter().filter(|i| !i.outcome.success).count();
    tracing::info!(
        items = items.len(),
        failed = failed,
        "Feed resolution complete"
    );

    FeedResult {
        feed_title: feed.title,
        feed_description: feed.description,
        items,
        success: true,
        error: None,
    }
}
