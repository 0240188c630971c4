//! End-to-end run against a mock server standing in for the feed host, the
//! linked page and the posting API.

use std::sync::Arc;

use feed2bsky::config::AccountConfig;
use feed2bsky::feed::HttpFeedSource;
use feed2bsky::fetcher::{http_client, SimpleFetcher};
use feed2bsky::publisher::BskyPublisher;
use feed2bsky::store::MemoryDedupStore;
use feed2bsky::{LinkCardBuilder, Orchestrator, TemplateRenderer};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

fn rss(base: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Example</title>
  <link>{base}</link>
  <description>Example feed</description>
  <item>
    <title>Older post</title>
    <link>{base}/older</link>
    <guid>older</guid>
    <pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate>
  </item>
  <item>
    <title>Newer post</title>
    <link>{base}/newer</link>
    <guid>newer</guid>
    <pubDate>Tue, 02 Jan 2024 10:00:00 GMT</pubDate>
  </item>
</channel></rss>"#
    )
}

async fn mount_api(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.createSession"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "did": "did:plc:bot",
            "handle": "bot.example.com",
            "accessJwt": "access-token",
            "refreshJwt": "refresh-token"
        })))
        // one login for the whole run
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.repo.uploadBlob"))
        .and(header("authorization", "Bearer access-token"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blob": {
                "$type": "blob",
                "ref": {"$link": "bafkreithumb"},
                "mimeType": "image/png",
                "size": PNG.len()
            }
        })))
        .mount(server)
        .await;
}

fn account(server: &MockServer) -> AccountConfig {
    AccountConfig {
        host: server.uri(),
        handle: "bot.example.com".to_string(),
        password: SecretString::from("app-password".to_string()),
    }
}

#[tokio::test]
async fn posts_new_items_with_card_and_facets() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss(&base)))
        .mount(&server)
        .await;
    for slug in ["older", "newer"] {
        Mock::given(method("GET"))
            .and(path(format!("/{slug}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<html><head><title>{slug} page</title>
                   <meta name="description" content="About {slug}">
                   <meta property="og:image" content="/img/{slug}.png">
                   </head></html>"#
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/img/{slug}.png")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG.to_vec()))
            .mount(&server)
            .await;
    }
    mount_api(&server).await;

    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.repo.createRecord"))
        .and(body_partial_json(json!({
            "repo": "did:plc:bot",
            "collection": "app.bsky.feed.post",
            "record": {
                "text": format!("Newer post\n{base}/newer"),
                "embed": {
                    "$type": "app.bsky.embed.external",
                    "external": {
                        "uri": format!("{base}/newer"),
                        "title": "newer page",
                        "description": "About newer",
                        "thumb": {"ref": {"$link": "bafkreithumb"}}
                    }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uri": "at://did:plc:bot/app.bsky.feed.post/newer",
            "cid": "bafyreinewer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.repo.createRecord"))
        .and(body_partial_json(json!({
            "record": {"text": format!("Older post\n{base}/older")}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uri": "at://did:plc:bot/app.bsky.feed.post/older",
            "cid": "bafyreiolder"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = http_client().unwrap();
    let publisher = Arc::new(BskyPublisher::new(&account(&server)).unwrap());
    let store = Arc::new(MemoryDedupStore::new());
    let orchestrator = Orchestrator::builder()
        .feed_url(format!("{base}/feed.xml"))
        .renderer(TemplateRenderer::new("{{title}}\n{{link}}").unwrap())
        .feed(Arc::new(HttpFeedSource::new(client.clone())))
        .store(store.clone())
        .publisher(publisher.clone())
        .cards(LinkCardBuilder::new(
            Arc::new(SimpleFetcher::with_client(client)),
            publisher,
        ))
        .build();

    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.published, 2);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn missing_page_still_posts_without_card() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss(&base)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_api(&server).await;
    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.repo.createRecord"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uri": "at://did:plc:bot/app.bsky.feed.post/1",
            "cid": "bafyrei1"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = http_client().unwrap();
    let publisher = Arc::new(BskyPublisher::new(&account(&server)).unwrap());
    let orchestrator = Orchestrator::builder()
        .feed_url(format!("{base}/feed.xml"))
        .renderer(TemplateRenderer::new("{{title}}\n{{link}}").unwrap())
        .feed(Arc::new(HttpFeedSource::new(client.clone())))
        .store(Arc::new(MemoryDedupStore::new()))
        .publisher(publisher.clone())
        .cards(LinkCardBuilder::new(
            Arc::new(SimpleFetcher::with_client(client)),
            publisher,
        ))
        .build();

    let summary = orchestrator.run().await.unwrap();
    assert_eq!(summary.published, 2);

    let requests = server.received_requests().await.unwrap();
    let uploads = requests
        .iter()
        .filter(|r| r.url.path() == "/xrpc/com.atproto.repo.uploadBlob")
        .count();
    assert_eq!(uploads, 0);
}

#[tokio::test]
async fn feed_server_error_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = http_client().unwrap();
    let publisher = Arc::new(BskyPublisher::new(&account(&server)).unwrap());
    let orchestrator = Orchestrator::builder()
        .feed_url(format!("{}/feed.xml", server.uri()))
        .renderer(TemplateRenderer::new("{{title}}").unwrap())
        .feed(Arc::new(HttpFeedSource::new(client.clone())))
        .store(Arc::new(MemoryDedupStore::new()))
        .publisher(publisher.clone())
        .cards(LinkCardBuilder::new(
            Arc::new(SimpleFetcher::with_client(client)),
            publisher,
        ))
        .build();

    let err = orchestrator.run().await.unwrap_err();
    assert!(err.to_string().contains("503"));
}
