//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl driver that coordinates one run:
//! - Loading the frontier cache (or starting fresh)
//! - Fetching the top stories list
//! - Processing stories in waves: fetch, normalize, collect comments
//! - Merging collection results into the frontier
//! - Writing per-story artifacts, the run index and the cache

use crate::config::Config;
use crate::crawler::client::{HnClient, ItemSource};
use crate::crawler::collector::{collect_comments, CollectOutcome, CrawlBudget};
use crate::crawler::parser::article_text;
use crate::crawler::transport::HttpClient;
use crate::item::{normalize_story, NormalizedStory};
use crate::output::RunSummary;
use crate::state::FrontierCache;
use crate::storage::{merge_comments, open_storage, JsonStorage, Storage};
use crate::DistillError;
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// A story whose collection finished and is ready to persist
struct CollectedStory {
    story: NormalizedStory,
    outcome: CollectOutcome,
    article: Option<String>,
}

/// Main crawl coordinator structure
pub struct Coordinator<S: ItemSource, T: Storage> {
    config: Arc<Config>,
    source: Arc<S>,
    storage: T,
    frontier: FrontierCache,
    budget: CrawlBudget,
}

impl<S: ItemSource, T: Storage> Coordinator<S, T> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `source` - Where stories and comments are fetched from
    /// * `storage` - Where artifacts and the frontier cache are written
    /// * `fresh` - Ignore the persisted frontier and start from an empty one
    pub fn new(config: Config, source: Arc<S>, storage: T, fresh: bool) -> Result<Self, DistillError> {
        let budget = CrawlBudget::from_config(&config.crawler)?;

        let frontier = if fresh {
            tracing::info!("Starting with an empty frontier");
            FrontierCache::new()
        } else {
            let frontier = FrontierCache::load(&storage.frontier_path());
            tracing::info!("Loaded frontier for {} stories", frontier.len());
            frontier
        };

        Ok(Self {
            config: Arc::new(config),
            source,
            storage,
            frontier,
            budget,
        })
    }

    pub fn frontier(&self) -> &FrontierCache {
        &self.frontier
    }

    /// Runs one crawl
    ///
    /// Per-story failures are logged and counted; only storage failures
    /// abort the run. The frontier cache is written once, after every story
    /// has been persisted.
    pub async fn run(&mut self) -> Result<RunSummary, DistillError> {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();

        let story_ids = self.source.top_story_ids(self.config.crawler.top_n).await;
        summary.stories_requested = story_ids.len();
        if story_ids.is_empty() {
            tracing::warn!("Top stories list is empty, nothing to crawl");
        } else {
            tracing::info!("Crawling {} stories", story_ids.len());
        }

        let mut written = Vec::with_capacity(story_ids.len());
        for wave in story_ids.chunks(self.budget.concurrency()) {
            let results = join_all(wave.iter().map(|&id| self.process_story(id))).await;

            for collected in results {
                let Some(collected) = collected else {
                    summary.stories_skipped += 1;
                    continue;
                };
                summary.comments.absorb(&collected.outcome.stats);
                if collected.article.is_some() {
                    summary.articles_written += 1;
                }
                written.push(collected.story.id);
                self.persist(collected)?;
            }

            tracing::info!(
                "Progress: {} / {} stories processed, {} new comments",
                written.len() + summary.stories_skipped,
                story_ids.len(),
                summary.comments.emitted
            );
        }
        summary.stories_written = written.len();

        self.storage.write_index(&written)?;
        let frontier_path = self.storage.frontier_path();
        if self.frontier.save(&frontier_path)? {
            tracing::debug!("Saved frontier cache to {}", frontier_path.display());
        }

        summary.elapsed = start_time.elapsed();
        summary.log();
        Ok(summary)
    }

    /// Fetches, normalizes and collects one story
    ///
    /// Returns `None` when the story is skipped.
    async fn process_story(&self, story_id: u64) -> Option<CollectedStory> {
        let node = match self.source.fetch_item(story_id).await {
            Ok(Some(node)) => node,
            Ok(None) => {
                tracing::warn!("Story {} is missing or invalid, skipping", story_id);
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch story {}: {}", story_id, e);
                return None;
            }
        };

        let story = match normalize_story(&node) {
            Ok(story) => story,
            Err(e) => {
                tracing::warn!("Skipping {}", e);
                return None;
            }
        };

        let seen = self.frontier.seen_by_depth(story_id);
        let outcome =
            collect_comments(self.source.as_ref(), &story.comment_ids, &self.budget, &seen).await;
        tracing::debug!(
            "Story {}: {} new comments, {} ids visited",
            story_id,
            outcome.comments.len(),
            outcome.stats.fetched()
        );

        let article = if self.config.crawler.fetch_articles {
            self.fetch_article(&story).await
        } else {
            None
        };

        Some(CollectedStory {
            story,
            outcome,
            article,
        })
    }

    /// Fetches and extracts the linked article, if the story has one
    async fn fetch_article(&self, story: &NormalizedStory) -> Option<String> {
        let url = story.url.as_deref()?;
        match self.source.fetch_page(url).await {
            Ok(html) => {
                let text = article_text(&html, self.config.crawler.article_slice_chars);
                if text.is_empty() {
                    tracing::debug!("No article text extracted for story {} from {}", story.id, url);
                    None
                } else {
                    Some(text)
                }
            }
            Err(e) => {
                tracing::warn!("Failed to fetch article for story {}: {}", story.id, e);
                None
            }
        }
    }

    /// Merges a collection into the frontier and writes the story's artifacts
    fn persist(&mut self, collected: CollectedStory) -> Result<(), DistillError> {
        let CollectedStory {
            story,
            outcome,
            article,
        } = collected;

        self.frontier
            .merge(story.id, &story.comment_ids, &outcome.all_seen_by_depth);

        self.storage.write_story(&story)?;

        let prior = self.storage.read_comments(story.id)?;
        let comments = merge_comments(prior, &outcome.comments);
        if self.storage.write_comments(story.id, &comments)? {
            tracing::debug!("Wrote {} comments for story {}", comments.len(), story.id);
        }

        if let Some(text) = article {
            self.storage.write_article(story.id, &text)?;
        }
        Ok(())
    }
}

/// Runs a complete crawl against the configured remote API
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Whether to ignore the persisted frontier cache
pub async fn run_crawl(config: Config, fresh: bool) -> Result<RunSummary, DistillError> {
    let http = HttpClient::from_config(&config.http, &config.crawler)?;
    let client = HnClient::new(http, &config.http.base_url);
    let storage: JsonStorage = open_storage(Path::new(&config.output.data_dir));

    let mut coordinator = Coordinator::new(config, Arc::new(client), storage, fresh)?;
    coordinator.run().await
}
