//! Per-item run loop.
//!
//! Items are handled one at a time, newest first:
//!
//! ```text
//! dedup insert ─┬─ already seen / store error ──────────────── Skipped
//!               └─ render ─┬─ error ────────────────────────── RenderFailed
//!                          └─ filter ─┬─ no match ──────────── FilteredOut
//!                                     ├─ dry run ───────────── DryRun
//!                                     └─ assemble + publish ─┬ Published
//!                                                            └ PublishFailed
//! ```
//!
//! The dedup key is committed before anything is posted, so an item whose
//! publish fails is not retried by later runs. No per-item outcome stops the
//! run; only fetching the feed can fail it.

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;

use crate::error::Result;
use crate::filter::Filter;
use crate::link_card::LinkCardBuilder;
use crate::post;
use crate::template::TemplateRenderer;
use crate::traits::{BaseDedupStore, BaseFeedSource, BasePublisher, InsertOutcome};
use crate::types::{DedupKey, FeedItem};

/// Terminal state of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Key was already recorded by an earlier run
    AlreadySeen,
    /// Dedup store failed for a reason other than a duplicate key
    StoreFailed { error: String },
    RenderFailed { error: String },
    FilteredOut,
    /// Rendered only; nothing posted
    DryRun { text: String },
    Published { uri: String },
    PublishFailed { error: String },
}

/// Outcome counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub published: usize,
    pub already_seen: usize,
    pub store_failed: usize,
    pub render_failed: usize,
    pub filtered_out: usize,
    pub dry_run: usize,
    pub publish_failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &ItemOutcome) {
        self.total += 1;
        match outcome {
            ItemOutcome::AlreadySeen => self.already_seen += 1,
            ItemOutcome::StoreFailed { .. } => self.store_failed += 1,
            ItemOutcome::RenderFailed { .. } => self.render_failed += 1,
            ItemOutcome::FilteredOut => self.filtered_out += 1,
            ItemOutcome::DryRun { .. } => self.dry_run += 1,
            ItemOutcome::Published { .. } => self.published += 1,
            ItemOutcome::PublishFailed { .. } => self.publish_failed += 1,
        }
    }
}

/// Drives a run. Build with [`Orchestrator::builder`].
#[derive(TypedBuilder)]
pub struct Orchestrator {
    #[builder(setter(into))]
    feed_url: String,
    #[builder(default = false)]
    dry_run: bool,
    renderer: TemplateRenderer,
    #[builder(default)]
    filter: Filter,
    feed: Arc<dyn BaseFeedSource>,
    store: Arc<dyn BaseDedupStore>,
    publisher: Arc<dyn BasePublisher>,
    cards: LinkCardBuilder,
}

impl Orchestrator {
    /// Fetch the feed and process every item. Fails only if the feed fetch fails.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut items = self.feed.fetch(&self.feed_url).await?;
        sort_newest_first(&mut items);

        let mut summary = RunSummary::default();
        for item in &items {
            let outcome = self.process(item).await;
            summary.record(&outcome);
        }

        info!(
            feed = %self.feed_url,
            total = summary.total,
            published = summary.published,
            already_seen = summary.already_seen,
            filtered_out = summary.filtered_out,
            failed = summary.store_failed + summary.render_failed + summary.publish_failed,
            dry_run = self.dry_run,
            "Run complete"
        );

        Ok(summary)
    }

    /// Drive one item to a terminal state. Never fails.
    pub async fn process(&self, item: &FeedItem) -> ItemOutcome {
        let key = DedupKey::new(&self.feed_url, &item.guid);
        match self.store.insert(&key).await {
            Ok(InsertOutcome::Inserted) => {}
            Ok(InsertOutcome::AlreadySeen) => {
                debug!(guid = %item.guid, "Already processed, skipping");
                return ItemOutcome::AlreadySeen;
            }
            Err(e) => {
                warn!(guid = %item.guid, error = %e, "Dedup store error, skipping item");
                return ItemOutcome::StoreFailed {
                    error: e.to_string(),
                };
            }
        }

        let text = match self.renderer.render(item) {
            Ok(text) => text,
            Err(e) => {
                error!(guid = %item.guid, error = %e, "Template render failed");
                return ItemOutcome::RenderFailed {
                    error: e.to_string(),
                };
            }
        };

        if !self.filter.matches(&text) {
            debug!(guid = %item.guid, "Rendered text does not match filter");
            return ItemOutcome::FilteredOut;
        }

        if self.dry_run {
            info!(guid = %item.guid, text = ?text, "Dry run, not posting");
            return ItemOutcome::DryRun { text };
        }

        let post = post::assemble(&text, &self.cards).await;
        match self.publisher.publish(&post).await {
            Ok(published) => {
                println!("{}", published.uri);
                info!(guid = %item.guid, uri = %published.uri, "Posted");
                ItemOutcome::Published {
                    uri: published.uri,
                }
            }
            Err(e) => {
                error!(
                    guid = %item.guid,
                    link = %item.link,
                    error = %e,
                    "Failed to create post; item is recorded and will not be retried"
                );
                ItemOutcome::PublishFailed {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Most recent first. Stable, so equal or missing timestamps keep feed order;
/// undated items go last.
pub fn sort_newest_first(items: &mut [FeedItem]) {
    items.sort_by_key(|item| Reverse(item.published_at));
}
