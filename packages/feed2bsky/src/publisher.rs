//! Posting API adapter.
//!
//! Maps a [`Post`] onto an `app.bsky.feed.post` record and owns the account
//! session. The session is created on first use and reused for the run; a
//! failed login is reported to the caller and retried on the next call.

use async_trait::async_trait;
use bsky::{Blob, BskyClient, ByteSlice, Embed, External, Facet, Feature, FeedPost, Session};
use chrono::{SecondsFormat, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::AccountConfig;
use crate::error::Result;
use crate::traits::{BaseBlobUploader, BasePublisher};
use crate::types::{EntityKind, Post, PublishedPost};

pub struct BskyPublisher {
    client: BskyClient,
    handle: String,
    password: SecretString,
    session: OnceCell<Session>,
}

impl BskyPublisher {
    pub fn new(account: &AccountConfig) -> Result<Self> {
        Ok(Self::with_client(
            BskyClient::new(account.host.as_str())?,
            account,
        ))
    }

    pub fn with_client(client: BskyClient, account: &AccountConfig) -> Self {
        Self {
            client,
            handle: account.handle.clone(),
            password: account.password.clone(),
            session: OnceCell::new(),
        }
    }

    async fn session(&self) -> Result<&Session> {
        let session = self
            .session
            .get_or_try_init(|| async {
                let session = self
                    .client
                    .create_session(&self.handle, self.password.expose_secret())
                    .await?;
                info!(handle = %session.handle, did = %session.did, "Session created");
                Ok::<_, crate::error::Error>(session)
            })
            .await?;

        Ok(session)
    }
}

#[async_trait]
impl BaseBlobUploader for BskyPublisher {
    async fn upload_blob(&self, bytes: Vec<u8>, mime_type: &str) -> Result<Blob> {
        let session = self.session().await?;
        Ok(self.client.upload_blob(session, bytes, mime_type).await?)
    }
}

#[async_trait]
impl BasePublisher for BskyPublisher {
    async fn publish(&self, post: &Post) -> Result<PublishedPost> {
        let session = self.session().await?;
        let record = to_record(post, &now());
        let created = self.client.create_post(session, &record).await?;

        Ok(PublishedPost {
            uri: created.uri,
            cid: created.cid,
        })
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Post record for `post`: link entities become link facets, hashtags
/// become tag facets, the card becomes an external embed.
pub fn to_record(post: &Post, created_at: &str) -> FeedPost {
    let mut record = FeedPost::new(post.text.clone(), created_at);

    record.facets = post
        .entities
        .iter()
        .map(|entity| Facet {
            index: ByteSlice {
                byte_start: entity.start_byte,
                byte_end: entity.end_byte,
            },
            features: vec![match entity.kind {
                EntityKind::Link => Feature::Link {
                    uri: entity.value.clone(),
                },
                EntityKind::Hashtag => Feature::Tag {
                    tag: entity.value.clone(),
                },
            }],
        })
        .collect();

    record.embed = post.embed.as_ref().map(|card| Embed::External {
        external: External {
            uri: card.uri.clone(),
            title: card.title.clone(),
            description: card.description.clone(),
            thumb: card.thumbnail.clone(),
        },
    });

    record
}
