//! Redis render cache against an in-process RESP server.

mod common;

use std::time::Duration;

use common::{FakeRedis, FakeRedisOptions};
use isuketch_render::cache::{CachedPage, RenderCache};

fn page(markup: &str) -> CachedPage {
    CachedPage::new(markup.to_string(), "<script></script>".to_string())
}

fn cache_for(redis: &FakeRedis) -> RenderCache {
    RenderCache::redis(&redis.url(), Duration::from_secs(60), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn stores_pages_under_the_raw_url() {
    let redis = FakeRedis::start(FakeRedisOptions::default()).await;
    let cache = cache_for(&redis);

    assert_eq!(cache.get("/rooms/1").await.unwrap(), None);
    cache.set("/rooms/1", page("<p>room</p>")).await.unwrap();

    assert!(redis.contains("/rooms/1"));
    let hit = cache.get("/rooms/1").await.unwrap().unwrap();
    assert_eq!(hit.markup, "<p>room</p>");
}

#[tokio::test]
async fn externally_deleted_key_is_a_miss() {
    let redis = FakeRedis::start(FakeRedisOptions::default()).await;
    let cache = cache_for(&redis);

    cache.set("/", page("<p>rooms</p>")).await.unwrap();
    assert!(cache.get("/").await.unwrap().is_some());

    assert!(redis.delete("/"));
    assert_eq!(cache.get("/").await.unwrap(), None);
}

#[tokio::test]
async fn reads_recover_after_connection_drop() {
    let redis = FakeRedis::start(FakeRedisOptions {
        drop_first_connection_after_get: true,
        ..Default::default()
    })
    .await;
    let cache = cache_for(&redis);

    cache.set("/", page("<p>rooms</p>")).await.unwrap();
    assert!(cache.get("/").await.unwrap().is_some());

    // The server has closed the first connection. The read that runs into
    // the closed socket may fail; the ones after it must use a new
    // connection.
    let mut recovered = false;
    for _ in 0..3 {
        if cache.get("/").await.is_ok() {
            recovered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(recovered, "cache never reconnected");

    for _ in 0..3 {
        let hit = cache.get("/").await.unwrap().unwrap();
        assert_eq!(hit.markup, "<p>rooms</p>");
    }
    assert!(redis.connections() >= 2);
}

#[tokio::test]
async fn rejected_write_is_an_error_and_reads_still_work() {
    let redis = FakeRedis::start(FakeRedisOptions {
        reject_writes: true,
        ..Default::default()
    })
    .await;
    let cache = cache_for(&redis);

    assert!(cache.set("/", page("x")).await.is_err());
    assert_eq!(redis.writes(), 1);
    assert_eq!(cache.get("/").await.unwrap(), None);
}
