//! Minimal XRPC client for the Bluesky posting API.
//!
//! Covers only what a feed bot needs: password session creation, blob upload
//! and record creation.

pub mod error;
pub mod models;

use std::time::Duration;

use reqwest::{header, Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

pub use crate::error::{BskyError, Result};
pub use crate::models::{
    Blob, ByteSlice, CidLink, Embed, External, Facet, Feature, FeedPost, RecordRef, Session,
    POST_COLLECTION,
};
use crate::models::{
    CreateRecordInput, CreateSessionInput, UploadBlobOutput, XrpcErrorBody,
};

pub const DEFAULT_HOST: &str = "https://bsky.social";

const CREATE_SESSION: &str = "com.atproto.server.createSession";
const UPLOAD_BLOB: &str = "com.atproto.repo.uploadBlob";
const CREATE_RECORD: &str = "com.atproto.repo.createRecord";

#[derive(Debug, Clone)]
pub struct BskyClient {
    host: String,
    client: Client,
}

impl BskyClient {
    pub fn new(host: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| BskyError::Transport {
                endpoint: "client",
                source,
            })?;

        Ok(Self::with_client(host, client))
    }

    pub fn with_client(host: impl Into<String>, client: Client) -> Self {
        let host = host.into().trim_end_matches('/').to_string();
        Self { host, client }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn endpoint_url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.host, nsid)
    }

    /// Authenticate with a handle (or DID/email) and app password.
    pub async fn create_session(&self, identifier: &str, password: &str) -> Result<Session> {
        debug!(host = %self.host, identifier = %identifier, "Creating session");

        let response = self
            .client
            .post(self.endpoint_url(CREATE_SESSION))
            .json(&CreateSessionInput {
                identifier,
                password,
            })
            .send()
            .await
            .map_err(|source| BskyError::Transport {
                endpoint: CREATE_SESSION,
                source,
            })?;

        decode(CREATE_SESSION, response).await
    }

    /// Upload binary content and return the blob reference to embed in records.
    pub async fn upload_blob(
        &self,
        session: &Session,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<Blob> {
        debug!(size = bytes.len(), mime_type = %mime_type, "Uploading blob");

        let response = self
            .client
            .post(self.endpoint_url(UPLOAD_BLOB))
            .bearer_auth(&session.access_jwt)
            .header(header::CONTENT_TYPE, mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|source| BskyError::Transport {
                endpoint: UPLOAD_BLOB,
                source,
            })?;

        let output: UploadBlobOutput = decode(UPLOAD_BLOB, response).await?;
        Ok(output.blob)
    }

    /// Create a record in the session account's repository.
    pub async fn create_record<R: Serialize>(
        &self,
        session: &Session,
        collection: &str,
        record: &R,
    ) -> Result<RecordRef> {
        debug!(repo = %session.did, collection = %collection, "Creating record");

        let response = self
            .client
            .post(self.endpoint_url(CREATE_RECORD))
            .bearer_auth(&session.access_jwt)
            .json(&CreateRecordInput {
                repo: &session.did,
                collection,
                record,
            })
            .send()
            .await
            .map_err(|source| BskyError::Transport {
                endpoint: CREATE_RECORD,
                source,
            })?;

        decode(CREATE_RECORD, response).await
    }

    /// Convenience wrapper for posting an `app.bsky.feed.post` record.
    pub async fn create_post(&self, session: &Session, post: &FeedPost) -> Result<RecordRef> {
        self.create_record(session, POST_COLLECTION, post).await
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &'static str, response: Response) -> Result<T> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|source| BskyError::Transport { endpoint, source })?;

    if !status.is_success() {
        let XrpcErrorBody { error, message } =
            serde_json::from_slice(&body).unwrap_or_default();
        return Err(BskyError::Api {
            endpoint,
            status: status.as_u16(),
            error,
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|source| BskyError::Decode { endpoint, source })
}
