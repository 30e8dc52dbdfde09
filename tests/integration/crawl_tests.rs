//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the item API and run the full
//! crawl cycle end-to-end against a temporary data directory.

use hn_distill::config::Config;
use hn_distill::crawler::{crawl, Coordinator, HnClient, HttpClient};
use hn_distill::storage::{JsonStorage, Storage};
use hn_distill::{FrontierCache, NormalizedComment, NormalizedStory};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NOW: u64 = 1_700_000_000;

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, data_dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.top_n = 10;
    config.crawler.max_depth = 3;
    config.crawler.concurrency = 4;
    config.crawler.batch_pause_ms = 0;
    config.http.base_url = format!("{}/v0", server.uri());
    config.http.timeout_ms = 2000;
    config.http.retries = 1;
    config.http.backoff_ms = 1;
    config.http.max_backoff_ms = 5;
    config.output.data_dir = data_dir.to_string_lossy().into_owned();
    config
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_item(server: &MockServer, id: u64, body: Value) {
    mount_json(server, &format!("/v0/item/{}.json", id), body).await;
}

fn story(id: u64, kids: &[u64]) -> Value {
    json!({
        "id": id,
        "type": "story",
        "title": format!("Story {}", id),
        "by": "poster",
        "time": NOW,
        "score": 100,
        "descendants": kids.len(),
        "kids": kids
    })
}

fn comment(id: u64, parent: u64, text: &str, kids: &[u64]) -> Value {
    json!({
        "id": id,
        "type": "comment",
        "by": format!("user{}", id),
        "time": NOW,
        "parent": parent,
        "text": text,
        "kids": kids
    })
}

/// Mounts the fixture used by most tests
///
/// - story 1: comments 11 (with reply 13) and 12 (empty body)
/// - story 2: comment 21 which always answers 500
/// - item 99 is a job, item 404 is null
async fn mount_fixture(server: &MockServer) {
    mount_json(server, "/v0/topstories.json", json!([1, 2, 99, 404])).await;

    mount_item(server, 1, story(1, &[11, 12])).await;
    mount_item(server, 11, comment(11, 1, "<p>First</p><p>Second paragraph</p>", &[13])).await;
    mount_item(server, 12, comment(12, 1, "", &[])).await;
    mount_item(server, 13, comment(13, 11, "A reply &amp; more", &[])).await;

    mount_item(server, 2, story(2, &[21])).await;
    Mock::given(method("GET"))
        .and(path("/v0/item/21.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;

    mount_item(server, 99, json!({"id": 99, "type": "job", "time": NOW})).await;
    Mock::given(method("GET"))
        .and(path("/v0/item/404.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(server)
        .await;
}

async fn item_fetches(server: &MockServer, id: u64) -> usize {
    let wanted = format!("/v0/item/{}.json", id);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == wanted)
        .count()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("Failed to parse JSON artifact")
}

fn comment_ids(storage: &JsonStorage, story_id: u64) -> Vec<u64> {
    storage
        .read_comments(story_id)
        .expect("Failed to read comments")
        .iter()
        .map(|c| c.id)
        .collect()
}

#[tokio::test]
async fn test_full_crawl_writes_artifacts() {
    let server = MockServer::start().await;
    mount_fixture(&server).await;
    let dir = TempDir::new().unwrap();

    let summary = crawl(create_test_config(&server, dir.path()), false)
        .await
        .expect("Crawl failed");

    assert_eq!(summary.stories_requested, 4);
    assert_eq!(summary.stories_written, 2);
    assert_eq!(summary.stories_skipped, 2);
    assert_eq!(summary.comments.emitted, 2);
    assert_eq!(summary.comments.empty_body, 1);
    assert_eq!(summary.comments.fetch_errors, 1);

    let storage = JsonStorage::new(dir.path());

    // Story artifact
    let saved: NormalizedStory = read_json(&storage.story_path(1));
    assert_eq!(saved.title, "Story 1");
    assert_eq!(saved.time_iso, "2023-11-14T22:13:20.000Z");
    assert_eq!(saved.comment_ids, vec![11, 12]);

    // Comment artifact: empty body skipped, reply kept with its depth
    let comments: Vec<NormalizedComment> = read_json(&storage.comments_path(1));
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].id, 11);
    assert_eq!(comments[0].text_plain, "First\n\nSecond paragraph");
    assert_eq!(comments[0].depth, 1);
    assert_eq!(comments[1].id, 13);
    assert_eq!(comments[1].text_plain, "A reply & more");
    assert_eq!(comments[1].parent, 11);
    assert_eq!(comments[1].depth, 2);

    // A story whose only comment failed still gets an (empty) artifact
    assert!(comment_ids(&storage, 2).is_empty());
    assert!(storage.comments_path(2).exists());

    // Skipped ids produce nothing
    assert!(!storage.story_path(99).exists());
    assert!(!storage.story_path(404).exists());

    // Index
    let index: Value = read_json(&storage.index_path());
    assert_eq!(index["storyIds"], json!([1, 2]));

    // Frontier records every visited id, failures included
    let frontier: Value = read_json(&storage.frontier_path());
    assert_eq!(frontier["1"]["seenTopLevel"], json!([11, 12]));
    assert_eq!(frontier["1"]["seenByDepth"]["1"], json!([11, 12]));
    assert_eq!(frontier["1"]["seenByDepth"]["2"], json!([13]));
    assert_eq!(frontier["2"]["seenByDepth"]["1"], json!([21]));

    // The failing comment was retried once, then given up on
    assert_eq!(item_fetches(&server, 21).await, 2);
}

#[tokio::test]
async fn test_second_run_skips_known_comments() {
    let server = MockServer::start().await;
    mount_fixture(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());

    crawl(config.clone(), false).await.expect("First crawl failed");
    let comment_fetches: usize = {
        let mut total = 0;
        for id in [11, 12, 13, 21] {
            total += item_fetches(&server, id).await;
        }
        total
    };

    let summary = crawl(config, false).await.expect("Second crawl failed");
    assert_eq!(summary.stories_written, 2);
    assert_eq!(summary.comments.emitted, 0);

    let mut after = 0;
    for id in [11, 12, 13, 21] {
        after += item_fetches(&server, id).await;
    }
    assert_eq!(after, comment_fetches, "known comments were fetched again");

    // Earlier comments survive a run that found nothing new
    let storage = JsonStorage::new(dir.path());
    assert_eq!(comment_ids(&storage, 1), vec![11, 13]);
}

#[tokio::test]
async fn test_new_comments_are_appended() {
    let server = MockServer::start().await;
    mount_json(&server, "/v0/topstories.json", json!([1])).await;

    // First run sees one comment, later runs see a second one
    Mock::given(method("GET"))
        .and(path("/v0/item/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(story(1, &[11])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_item(&server, 1, story(1, &[11, 14])).await;
    mount_item(&server, 11, comment(11, 1, "old", &[])).await;
    mount_item(&server, 14, comment(14, 1, "new", &[])).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());

    crawl(config.clone(), false).await.expect("First crawl failed");
    let storage = JsonStorage::new(dir.path());
    assert_eq!(comment_ids(&storage, 1), vec![11]);

    let summary = crawl(config, false).await.expect("Second crawl failed");
    assert_eq!(summary.comments.emitted, 1);
    assert_eq!(comment_ids(&storage, 1), vec![11, 14]);
    assert_eq!(item_fetches(&server, 11).await, 1);

    let frontier = FrontierCache::load(&storage.frontier_path());
    let entry = frontier.get(1).expect("story missing from frontier");
    assert_eq!(entry.seen_top_level.len(), 2);
    assert_eq!(entry.seen_by_depth[&1].len(), 2);
}

#[tokio::test]
async fn test_fresh_run_ignores_frontier() {
    let server = MockServer::start().await;
    mount_fixture(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());

    crawl(config.clone(), false).await.expect("First crawl failed");
    let summary = crawl(config, true).await.expect("Fresh crawl failed");

    assert_eq!(summary.comments.emitted, 2);
    assert_eq!(item_fetches(&server, 11).await, 2);
}

#[tokio::test]
async fn test_legacy_frontier_is_migrated() {
    let server = MockServer::start().await;
    mount_fixture(&server).await;
    let dir = TempDir::new().unwrap();

    let storage = JsonStorage::new(dir.path());
    let cache_path = storage.frontier_path();
    std::fs::create_dir_all(cache_path.parent().unwrap()).unwrap();
    std::fs::write(
        &cache_path,
        r#"{"1": [11], "2": {"seenKids": [21], "seenByDepth": {"1": [21]}}, "junk": 5}"#,
    )
    .unwrap();

    crawl(create_test_config(&server, dir.path()), false)
        .await
        .expect("Crawl failed");

    // Story 2's only comment was already seen, so it is not fetched
    assert_eq!(item_fetches(&server, 21).await, 0);

    let frontier = FrontierCache::load(&cache_path);
    assert_eq!(frontier.len(), 2);
    let entry = frontier.get(2).unwrap();
    assert!(entry.seen_top_level.contains(&21));
    assert!(!entry.updated_iso.is_empty());
}

#[tokio::test]
async fn test_article_fetch() {
    let server = MockServer::start().await;
    mount_json(&server, "/v0/topstories.json", json!([1, 2])).await;

    let mut linked = story(1, &[]);
    linked["url"] = json!(format!("{}/article", server.uri()));
    mount_item(&server, 1, linked).await;

    let mut broken = story(2, &[]);
    broken["url"] = json!(format!("{}/missing", server.uri()));
    mount_item(&server, 2, broken).await;

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><h1>Headline</h1><p>Body text.</p><script>x()</script></body></html>",
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, dir.path());
    config.crawler.fetch_articles = true;

    let summary = crawl(config, false).await.expect("Crawl failed");
    assert_eq!(summary.stories_written, 2);
    assert_eq!(summary.articles_written, 1);

    let storage = JsonStorage::new(dir.path());
    let article = std::fs::read_to_string(storage.article_path(1)).unwrap();
    assert_eq!(article, "# Headline\n\nBody text.");
    assert!(!storage.article_path(2).exists());
}

#[tokio::test]
async fn test_empty_top_stories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/topstories.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let summary = crawl(create_test_config(&server, dir.path()), false)
        .await
        .expect("Crawl failed");

    assert_eq!(summary.stories_requested, 0);
    let storage = JsonStorage::new(dir.path());
    let index: Value = read_json(&storage.index_path());
    assert_eq!(index["storyIds"], json!([]));
}

#[tokio::test]
async fn test_coordinator_with_explicit_client() {
    let server = MockServer::start().await;
    mount_fixture(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());

    let http = HttpClient::from_config(&config.http, &config.crawler).unwrap();
    let client = Arc::new(HnClient::new(http, &config.http.base_url));
    let storage = JsonStorage::new(dir.path());

    let mut coordinator = Coordinator::new(config, client, storage, false).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.stories_written, 2);
    assert_eq!(coordinator.frontier().len(), 2);
    assert_eq!(
        coordinator.frontier().seen_by_depth(1)[&2].iter().copied().collect::<Vec<_>>(),
        vec![13]
    );
}

#[tokio::test]
async fn test_in_flight_requests_bounded_across_stories() {
    let server = MockServer::start().await;
    mount_json(&server, "/v0/topstories.json", json!([1, 2])).await;

    let delay = std::time::Duration::from_millis(200);
    let items = [
        story(1, &[11, 12]),
        story(2, &[21, 22]),
        comment(11, 1, "a", &[]),
        comment(12, 1, "b", &[]),
        comment(21, 2, "c", &[]),
        comment(22, 2, "d", &[]),
    ];
    for item in items {
        let id = item["id"].as_u64().unwrap();
        Mock::given(method("GET"))
            .and(path(format!("/v0/item/{}.json", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(item).set_delay(delay))
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, dir.path());
    config.crawler.concurrency = 2;

    let start = std::time::Instant::now();
    let summary = crawl(config, false).await.expect("Crawl failed");
    let elapsed = start.elapsed();

    assert_eq!(summary.stories_written, 2);
    assert_eq!(summary.comments.emitted, 4);
    // One wave of 2 stories, then 4 comments from two collectors, 2 at a time
    assert!(
        elapsed >= std::time::Duration::from_millis(580),
        "more than 2 requests were in flight: {:?}",
        elapsed
    );
}
