//! Testing utilities including in-memory collaborators.
//!
//! These let the orchestrator and the link card builder run without network
//! access. Every double records the calls it receives for assertions.

use async_trait::async_trait;
use bsky::{Blob, CidLink};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::store::MemoryDedupStore;
use crate::traits::{
    BaseBlobUploader, BaseDedupStore, BaseFeedSource, BasePublisher, BaseWebFetcher, FetchedBytes,
    InsertOutcome,
};
use crate::types::{DedupKey, FeedItem, Post, PublishedPost};

/// Feed source returning a fixed list of items.
#[derive(Default)]
pub struct StaticFeedSource {
    items: Vec<FeedItem>,
    fail: bool,
}

impl StaticFeedSource {
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self { items, fail: false }
    }

    /// A source whose fetch always fails.
    pub fn unreachable() -> Self {
        Self {
            items: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl BaseFeedSource for StaticFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>> {
        if self.fail {
            return Err(Error::Other(format!("feed unreachable: {url}")));
        }
        Ok(self.items.clone())
    }
}

/// Dedup store that errors for chosen GUIDs and otherwise behaves like
/// [`MemoryDedupStore`].
#[derive(Default)]
pub struct FlakyDedupStore {
    inner: MemoryDedupStore,
    failing_guids: Vec<String>,
}

impl FlakyDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, guid: impl Into<String>) -> Self {
        self.failing_guids.push(guid.into());
        self
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.inner.contains(key)
    }
}

#[async_trait]
impl BaseDedupStore for FlakyDedupStore {
    async fn insert(&self, key: &DedupKey) -> Result<InsertOutcome> {
        if self.failing_guids.contains(&key.guid) {
            return Err(Error::Other(format!("connection reset while recording {}", key.guid)));
        }
        self.inner.insert(key).await
    }
}

/// Web fetcher serving predefined pages and images.
#[derive(Default)]
pub struct MockWebFetcher {
    pages: HashMap<String, String>,
    images: HashMap<String, Vec<u8>>,
    page_requests: Arc<RwLock<Vec<String>>>,
    image_requests: Arc<RwLock<Vec<String>>>,
}

impl MockWebFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn with_image(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.images.insert(url.into(), bytes);
        self
    }

    pub fn page_requests(&self) -> Vec<String> {
        self.page_requests.read().unwrap().clone()
    }

    pub fn image_requests(&self) -> Vec<String> {
        self.image_requests.read().unwrap().clone()
    }
}

#[async_trait]
impl BaseWebFetcher for MockWebFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        self.page_requests.write().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| Error::Status {
            status: 404,
            url: url.to_string(),
        })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<FetchedBytes> {
        self.image_requests.write().unwrap().push(url.to_string());
        self.images
            .get(url)
            .map(|bytes| FetchedBytes {
                bytes: bytes.clone(),
                content_type: None,
            })
            .ok_or_else(|| Error::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// Record of a call made to the mock publisher.
#[derive(Debug, Clone)]
pub enum MockPublisherCall {
    UploadBlob { size: usize, mime_type: String },
    Publish { post: Post },
}

/// Posting API double. Succeeds unless told otherwise.
#[derive(Default)]
pub struct MockPublisher {
    fail_uploads: bool,
    /// Publish fails for posts whose text contains any of these
    fail_publish_containing: Vec<String>,
    calls: Arc<RwLock<Vec<MockPublisherCall>>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn failing_publish_for(mut self, needle: impl Into<String>) -> Self {
        self.fail_publish_containing.push(needle.into());
        self
    }

    pub fn calls(&self) -> Vec<MockPublisherCall> {
        self.calls.read().unwrap().clone()
    }

    /// Posts passed to `publish`, including ones that failed.
    pub fn published(&self) -> Vec<Post> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockPublisherCall::Publish { post } => Some(post),
                MockPublisherCall::UploadBlob { .. } => None,
            })
            .collect()
    }

    pub fn upload_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, MockPublisherCall::UploadBlob { .. }))
            .count()
    }
}

#[async_trait]
impl BaseBlobUploader for MockPublisher {
    async fn upload_blob(&self, bytes: Vec<u8>, mime_type: &str) -> Result<Blob> {
        self.calls.write().unwrap().push(MockPublisherCall::UploadBlob {
            size: bytes.len(),
            mime_type: mime_type.to_string(),
        });

        if self.fail_uploads {
            return Err(Error::Other("upload rejected".to_string()));
        }

        Ok(Blob {
            kind: "blob".to_string(),
            cid: CidLink {
                link: format!("bafkreimock{}", bytes.len()),
            },
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
        })
    }
}

#[async_trait]
impl BasePublisher for MockPublisher {
    async fn publish(&self, post: &Post) -> Result<PublishedPost> {
        let index = {
            let mut calls = self.calls.write().unwrap();
            calls.push(MockPublisherCall::Publish { post: post.clone() });
            calls.len()
        };

        if self
            .fail_publish_containing
            .iter()
            .any(|needle| post.text.contains(needle))
        {
            return Err(Error::Other("record creation rejected".to_string()));
        }

        Ok(PublishedPost {
            uri: format!("at://did:plc:mock/app.bsky.feed.post/{index}"),
            cid: format!("bafyreimock{index}"),
        })
    }
}
