// Entry point for the feed2bsky batch job

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use feed2bsky::config::Cli;
use feed2bsky::feed::HttpFeedSource;
use feed2bsky::fetcher::{http_client, SimpleFetcher};
use feed2bsky::publisher::BskyPublisher;
use feed2bsky::store::PostgresDedupStore;
use feed2bsky::{Config, Filter, LinkCardBuilder, Orchestrator, TemplateRenderer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries only post URIs
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,feed2bsky=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from(Cli::parse());
    config.validate().context("Invalid configuration")?;

    let renderer = TemplateRenderer::new(&config.template).context("Failed to parse template")?;
    let filter = Filter::new(config.filter.as_deref()).context("Failed to parse filter pattern")?;

    let store = PostgresDedupStore::connect(&config.dsn)
        .await
        .context("Failed to open dedup store")?;
    let store = Arc::new(store);

    let client = http_client().context("Failed to create HTTP client")?;
    let publisher =
        Arc::new(BskyPublisher::new(&config.account).context("Failed to create API client")?);
    let cards = LinkCardBuilder::new(
        Arc::new(SimpleFetcher::with_client(client.clone())),
        publisher.clone(),
    );

    let orchestrator = Orchestrator::builder()
        .feed_url(config.feed_url.clone())
        .dry_run(config.dry_run)
        .renderer(renderer)
        .filter(filter)
        .feed(Arc::new(HttpFeedSource::new(client)))
        .store(store.clone())
        .publisher(publisher)
        .cards(cards)
        .build();

    tracing::info!(feed = %config.feed_url, dry_run = config.dry_run, "Starting run");

    let summary = orchestrator
        .run()
        .await
        .with_context(|| format!("Failed to fetch feed {}", config.feed_url))?;
    tracing::debug!(?summary, "Run summary");

    store.close().await;
    Ok(())
}
