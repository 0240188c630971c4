//! Feed to Bluesky bridge.
//!
//! Turns new items of a single syndication feed into rich-text posts. Each
//! run is a batch job: fetch the feed, newest item first, record the item's
//! dedup key, render it through a template, optionally filter it, then
//! assemble facets and a link card and publish.
//!
//! # Modules
//!
//! - [`richtext`] - URL and hashtag detection with UTF-8 byte offsets
//! - [`link_card`] - Link preview cards with optional uploaded thumbnail
//! - [`template`] - Handlebars post templates and the `normalize` helper
//! - [`filter`] - Optional regex inclusion gate
//! - [`post`] - Post assembly (facets + at most one embed)
//! - [`orchestrator`] - Per-item run loop with failure isolation
//! - [`store`] - Dedup key stores (Postgres, in-memory)
//! - [`feed`] - Feed retrieval
//! - [`fetcher`] - HTTP page and image fetching
//! - [`publisher`] - Posting API adapter
//! - [`testing`] - In-memory doubles for tests

pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod filter;
pub mod link_card;
pub mod orchestrator;
pub mod post;
pub mod publisher;
pub mod richtext;
pub mod store;
pub mod template;
pub mod testing;
pub mod traits;
pub mod types;

pub use config::{AccountConfig, Config};
pub use error::{Error, Result};
pub use filter::Filter;
pub use link_card::LinkCardBuilder;
pub use orchestrator::{ItemOutcome, Orchestrator, RunSummary};
pub use post::assemble;
pub use template::TemplateRenderer;
pub use traits::{BaseBlobUploader, BaseDedupStore, BaseFeedSource, BasePublisher, BaseWebFetcher};
pub use types::{DedupKey, EmbedCard, EntityKind, FeedItem, Post, TextEntity};
