// Trait definitions for the external collaborators of a run.
//
// These are INFRASTRUCTURE traits only. The per-item decision logic lives in
// the orchestrator and talks to the outside world through these seams.
//
// Naming convention: Base* for trait names (e.g., BaseDedupStore, BasePublisher)

use async_trait::async_trait;
use bsky::Blob;

use crate::error::Result;
use crate::types::{DedupKey, FeedItem, Post, PublishedPost};

// =============================================================================
// Feed Source Trait
// =============================================================================

#[async_trait]
pub trait BaseFeedSource: Send + Sync {
    /// Fetch and parse the feed. Order is whatever the feed document uses.
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>>;
}

// =============================================================================
// Dedup Store Trait
// =============================================================================

/// Result of recording a dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Key was new and is now recorded
    Inserted,
    /// Key was recorded by an earlier run
    AlreadySeen,
}

#[async_trait]
pub trait BaseDedupStore: Send + Sync {
    /// Insert-if-absent. A duplicate key is `Ok(AlreadySeen)`, never an error.
    async fn insert(&self, key: &DedupKey) -> Result<InsertOutcome>;
}

// =============================================================================
// Web Fetcher Trait (link cards)
// =============================================================================

/// Raw response body plus the server-declared content type.
#[derive(Debug, Clone)]
pub struct FetchedBytes {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait BaseWebFetcher: Send + Sync {
    /// Fetch a page as text
    async fn fetch_html(&self, url: &str) -> Result<String>;

    /// Fetch a binary resource (thumbnails)
    async fn fetch_bytes(&self, url: &str) -> Result<FetchedBytes>;
}

// =============================================================================
// Posting API Traits
// =============================================================================

#[async_trait]
pub trait BaseBlobUploader: Send + Sync {
    /// Upload binary content, returning its content reference
    async fn upload_blob(&self, bytes: Vec<u8>, mime_type: &str) -> Result<Blob>;
}

#[async_trait]
pub trait BasePublisher: Send + Sync {
    /// Create the post record on the authenticated account
    async fn publish(&self, post: &Post) -> Result<PublishedPost>;
}
