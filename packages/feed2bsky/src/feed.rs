//! Feed retrieval: RSS, Atom and JSON Feed via `feed-rs`.

use async_trait::async_trait;
use feed_rs::model::Entry;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::traits::BaseFeedSource;
use crate::types::FeedItem;

pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BaseFeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>> {
        debug!(url = %url, "Fetching feed");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;

        let items = parse_feed(&body)?;
        info!(url = %url, items = items.len(), "Fetched feed");
        Ok(items)
    }
}

/// Parse a feed document into items, in document order.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedItem>> {
    let feed = feed_rs::parser::parse(body)?;
    Ok(feed.entries.into_iter().map(into_item).collect())
}

fn into_item(entry: Entry) -> FeedItem {
    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone())
        .unwrap_or_default();

    FeedItem {
        guid: entry.id,
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        link,
        published_at: entry.published.or(entry.updated),
        description: entry.summary.map(|t| t.content),
        categories: entry.categories.into_iter().map(|c| c.term).collect(),
    }
}
