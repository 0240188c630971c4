//! HTTP fetching for link card pages and thumbnails.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::{BaseWebFetcher, FetchedBytes};

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; ",
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Shared client settings for every outbound fetch of a run.
pub fn http_client() -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;

    Ok(client)
}

/// Plain reqwest fetcher. No JavaScript rendering.
pub struct SimpleFetcher {
    client: reqwest::Client,
}

impl SimpleFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(http_client()?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str, accept: &'static str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, accept)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl BaseWebFetcher for SimpleFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Fetching page");
        let response = self
            .get(url, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .await?;
        Ok(response.text().await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<FetchedBytes> {
        debug!(url = %url, "Fetching image");
        let response = self.get(url, "image/*,*/*;q=0.8").await?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedBytes {
            bytes,
            content_type,
        })
    }
}
