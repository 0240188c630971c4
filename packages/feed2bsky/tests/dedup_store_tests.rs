//! PostgresDedupStore against a real database. Needs Docker:
//! `cargo test -p feed2bsky --test dedup_store_tests -- --ignored`

mod common;

use common::TestHarness;
use feed2bsky::store::PostgresDedupStore;
use feed2bsky::traits::{BaseDedupStore, InsertOutcome};
use feed2bsky::DedupKey;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn first_insert_wins(ctx: &TestHarness) {
    let key = DedupKey::new("https://first-insert.example/feed", "guid-1");

    let first = ctx.store.insert(&key).await.unwrap();
    let second = ctx.store.insert(&key).await.unwrap();

    assert_eq!(first, InsertOutcome::Inserted);
    assert_eq!(second, InsertOutcome::AlreadySeen);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn same_guid_in_other_feed_is_new(ctx: &TestHarness) {
    let a = DedupKey::new("https://feed-a.example/rss", "shared");
    let b = DedupKey::new("https://feed-b.example/rss", "shared");

    assert_eq!(ctx.store.insert(&a).await.unwrap(), InsertOutcome::Inserted);
    assert_eq!(ctx.store.insert(&b).await.unwrap(), InsertOutcome::Inserted);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn schema_setup_is_idempotent(ctx: &TestHarness) {
    let key = DedupKey::new("https://schema.example/feed", "kept");
    ctx.store.insert(&key).await.unwrap();

    // a second store over the same database must not drop existing rows
    let again = PostgresDedupStore::from_pool(ctx.db_pool.clone())
        .await
        .unwrap();

    assert_eq!(again.insert(&key).await.unwrap(), InsertOutcome::AlreadySeen);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn concurrent_inserts_admit_exactly_one(ctx: &TestHarness) {
    let key = DedupKey::new("https://race.example/feed", "contended");

    let (a, b, c, d) = tokio::join!(
        ctx.store.insert(&key),
        ctx.store.insert(&key),
        ctx.store.insert(&key),
        ctx.store.insert(&key),
    );
    let inserted = [a, b, c, d]
        .into_iter()
        .filter(|r| matches!(r, Ok(InsertOutcome::Inserted)))
        .count();

    assert_eq!(inserted, 1);
}
