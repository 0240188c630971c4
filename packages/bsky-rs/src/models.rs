//! Wire models for the XRPC endpoints and records used by this client.
//!
//! Field names follow the lexicon JSON (camelCase, `$type` discriminators).

use serde::{Deserialize, Serialize};

pub const POST_COLLECTION: &str = "app.bsky.feed.post";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionInput<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Authenticated session returned by `com.atproto.server.createSession`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub did: String,
    pub handle: String,
    pub access_jwt: String,
    pub refresh_jwt: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// CID link wrapper (`{"$link": "bafk..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidLink {
    #[serde(rename = "$link")]
    pub link: String,
}

/// Reference to uploaded binary content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    #[serde(rename = "$type", default = "blob_type")]
    pub kind: String,
    #[serde(rename = "ref")]
    pub cid: CidLink,
    pub mime_type: String,
    pub size: u64,
}

fn blob_type() -> String {
    "blob".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadBlobOutput {
    pub blob: Blob,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRecordInput<'a, R: Serialize> {
    pub repo: &'a str,
    pub collection: &'a str,
    pub record: &'a R,
}

/// Strong reference to a created record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordRef {
    pub uri: String,
    pub cid: String,
}

/// XRPC error body (`{"error": "...", "message": "..."}`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XrpcErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// `app.bsky.feed.post` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    #[serde(rename = "$type")]
    pub kind: String,
    pub text: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
}

impl FeedPost {
    pub fn new(text: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            kind: POST_COLLECTION.to_string(),
            text: text.into(),
            created_at: created_at.into(),
            facets: Vec::new(),
            embed: None,
        }
    }
}

/// Annotation of a sub-string within rich text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<Feature>,
}

/// Byte range into the UTF-8 encoded post text. Start inclusive, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Feature {
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Embed {
    #[serde(rename = "app.bsky.embed.external")]
    External { external: External },
}

/// Link card payload of an external embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct External {
    pub uri: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<Blob>,
}
