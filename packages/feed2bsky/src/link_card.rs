//! Link preview cards.
//!
//! Building a card never fails outright. Each step (page fetch, metadata,
//! thumbnail fetch, thumbnail upload) degrades to a smaller result:
//! - page fetch fails: no card
//! - metadata missing: the URL stands in for title/description
//! - thumbnail fetch or upload fails: card without thumbnail

use std::sync::Arc;

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::traits::{BaseBlobUploader, BaseWebFetcher, FetchedBytes};
use crate::types::{EmbedCard, ThumbnailImage};

/// Metadata pulled from a page's `<head>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub og_title: Option<String>,
    pub description: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
}

impl PageMeta {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        Self {
            title: select_text(&document, "title"),
            og_title: select_content(&document, r#"meta[property="og:title"]"#),
            description: select_content(&document, r#"meta[name="description"]"#)
                .or_else(|| select_content(&document, r#"meta[property="description"]"#)),
            og_description: select_content(&document, r#"meta[property="og:description"]"#),
            og_image: select_content(&document, r#"meta[property="og:image"]"#),
        }
    }

    /// `<title>`, then `og:title`, then the URL itself.
    pub fn resolved_title(&self, url: &str) -> String {
        self.title
            .clone()
            .or_else(|| self.og_title.clone())
            .unwrap_or_else(|| url.to_string())
    }

    /// `description`, then `og:description`, then the URL itself.
    pub fn resolved_description(&self, url: &str) -> String {
        self.description
            .clone()
            .or_else(|| self.og_description.clone())
            .unwrap_or_else(|| url.to_string())
    }
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn select_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty())
}

pub struct LinkCardBuilder {
    fetcher: Arc<dyn BaseWebFetcher>,
    uploader: Arc<dyn BaseBlobUploader>,
}

impl LinkCardBuilder {
    pub fn new(fetcher: Arc<dyn BaseWebFetcher>, uploader: Arc<dyn BaseBlobUploader>) -> Self {
        Self { fetcher, uploader }
    }

    /// Build a card for `url`. `None` only when the page itself is unavailable.
    pub async fn build(&self, url: &str) -> Option<EmbedCard> {
        let html = match self.fetcher.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %url, error = %e, "Link card page fetch failed, posting without card");
                return None;
            }
        };

        let meta = PageMeta::parse(&html);
        let mut card = EmbedCard {
            title: meta.resolved_title(url),
            description: meta.resolved_description(url),
            uri: url.to_string(),
            thumbnail: None,
        };

        if let Some(image_url) = meta.og_image.as_deref().and_then(|src| resolve(url, src)) {
            if let Some(image) = self.fetch_thumbnail(&image_url).await {
                card.thumbnail = match self.uploader.upload_blob(image.bytes, &image.mime_type).await
                {
                    Ok(blob) => Some(blob),
                    Err(e) => {
                        warn!(image_url = %image_url, error = %e, "Thumbnail upload failed");
                        None
                    }
                };
            }
        }

        debug!(
            url = %url,
            title = %card.title,
            has_thumbnail = card.thumbnail.is_some(),
            "Built link card"
        );

        Some(card)
    }

    async fn fetch_thumbnail(&self, image_url: &str) -> Option<ThumbnailImage> {
        let FetchedBytes {
            bytes,
            content_type,
        } = match self.fetcher.fetch_bytes(image_url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(image_url = %image_url, error = %e, "Thumbnail fetch failed");
                return None;
            }
        };

        if bytes.is_empty() {
            debug!(image_url = %image_url, "Thumbnail is empty, skipping");
            return None;
        }

        let mime_type = detect_mime(&bytes, image_url, content_type.as_deref());
        Some(ThumbnailImage {
            size: bytes.len(),
            bytes,
            mime_type,
        })
    }
}

/// Resolve a possibly relative `og:image` against the page URL.
fn resolve(page_url: &str, src: &str) -> Option<String> {
    match Url::parse(src) {
        Ok(absolute) => Some(absolute.to_string()),
        Err(_) => Url::parse(page_url)
            .and_then(|base| base.join(src))
            .map(|u| u.to_string())
            .ok(),
    }
}

/// MIME type from content signature, then the server's image content type,
/// then the URL extension.
pub fn detect_mime(bytes: &[u8], url: &str, declared: Option<&str>) -> String {
    if let Some(sniffed) = sniff_mime(bytes) {
        return sniffed.to_string();
    }

    if let Some(declared) = declared
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| ct.starts_with("image/"))
    {
        return declared.to_string();
    }

    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xFF\xD8\xFF", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"BM", "image/bmp"),
        (b"\x00\x00\x01\x00", "image/x-icon"),
    ];

    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    if let Some((_, mime)) = SIGNATURES.iter().find(|(sig, _)| bytes.starts_with(sig)) {
        return Some(*mime);
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    let head = head.trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        return Some("image/svg+xml");
    }

    None
}
