//! Core data types flowing through a run.

use bsky::Blob;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One entry of the source feed. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub guid: String,
    pub title: String,
    pub link: String,
    #[serde(rename = "published")]
    pub published_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub categories: Vec<String>,
}

impl FeedItem {
    pub fn new(guid: impl Into<String>, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            title: title.into(),
            link: link.into(),
            published_at: None,
            description: None,
            categories: Vec::new(),
        }
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }
}

/// Unique key of a processed item: the feed it came from plus its GUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub feed: String,
    pub guid: String,
}

impl DedupKey {
    pub fn new(feed: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            feed: feed.into(),
            guid: guid.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Link,
    Hashtag,
}

/// Annotated span of post text. Offsets index the UTF-8 bytes of the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntity {
    pub kind: EntityKind,
    pub start_byte: usize,
    pub end_byte: usize,
    /// URL for links; tag without the leading `#` for hashtags
    pub value: String,
}

impl TextEntity {
    pub fn overlaps(&self, other: &TextEntity) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }
}

/// Thumbnail bytes fetched for a card, before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub size: usize,
}

/// Link preview attached to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedCard {
    pub title: String,
    pub description: String,
    pub uri: String,
    /// Uploaded thumbnail reference (content ref, MIME type, size)
    pub thumbnail: Option<Blob>,
}

/// Publishable post: text, its entities and at most one link card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub text: String,
    pub entities: Vec<TextEntity>,
    pub embed: Option<EmbedCard>,
}

impl Post {
    pub fn links(&self) -> impl Iterator<Item = &TextEntity> {
        self.entities
            .iter()
            .filter(|entity| entity.kind == EntityKind::Link)
    }

    pub fn hashtags(&self) -> impl Iterator<Item = &TextEntity> {
        self.entities
            .iter()
            .filter(|entity| entity.kind == EntityKind::Hashtag)
    }
}

/// Identifier of a published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub uri: String,
    pub cid: String,
}
