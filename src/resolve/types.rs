use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// Outcome of resolving one URL.
///
/// When `success` is false, `resolved` always equals `original` and `error`
/// carries the reason. Build failed outcomes through [`ResolutionOutcome::failed`]
/// so the two fields cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionOutcome {
    /// The URL as supplied by the caller or the feed.
    pub original: String,
    /// Best terminal URL found.
    pub resolved: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolutionOutcome {
    pub fn resolved(original: impl Into<String>, resolved: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            resolved: resolved.into(),
            success: true,
            error: None,
        }
    }

    /// Input that needed no resolution.
    pub fn unchanged(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            resolved: original.clone(),
            original,
            success: true,
            error: None,
        }
    }

    /// Degrade-to-input: resolution could not complete.
    pub fn failed(original: impl Into<String>, error: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            resolved: original.clone(),
            original,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// One entry of a parsed feed, as handed to the fan-out stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    /// Publication date in RSS `pubDate` (RFC 2822) form.
    pub publication_date: Option<String>,
    /// Article link; empty when the entry carried none.
    pub link: String,
}

/// A [`ResolutionOutcome`] carrying its feed item's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItemOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "pubDate", skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(flatten)]
    pub outcome: ResolutionOutcome,
}

/// Aggregated result of resolving a whole feed.
///
/// Serialized with camelCase keys. A failed result has no `items` key at
/// all; a successful one always carries the array, even when empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResult {
    pub feed_title: Option<String>,
    pub feed_description: Option<String>,
    /// Source feed order, at most [`MAX_FEED_ITEMS`](super::MAX_FEED_ITEMS) entries.
    pub items: Vec<FeedItemOutcome>,
    pub success: bool,
    pub error: Option<String>,
}

impl Serialize for FeedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FeedResult", 5)?;

        match &self.feed_title {
            Some(title) => state.serialize_field("feedTitle", title)?,
            None => state.skip_field("feedTitle")?,
        }
        match &self.feed_description {
            Some(description) => state.serialize_field("feedDescription", description)?,
            None => state.skip_field("feedDescription")?,
        }
        if self.success || !self.items.is_empty() {
            state.serialize_field("items", &self.items)?;
        } else {
            state.skip_field("items")?;
        }
        state.serialize_field("success", &self.success)?;
        match &self.error {
            Some(error) => state.serialize_field("error", error)?,
            None => state.skip_field("error")?,
        }

        state.end()
    }
}

impl FeedResult {
    /// The feed itself could not be obtained.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            feed_title: None,
            feed_description: None,
            items: Vec::new(),
            success: false,
            error: Some(error.into()),
        }
    }
}
