//! Statistics for crawl runs and the frontier cache
//!
//! This module provides the per-run summary returned by the crawl driver and
//! the frontier statistics shown by `--stats`.

use crate::crawler::CollectStats;
use crate::state::FrontierCache;
use std::collections::BTreeMap;
use std::time::Duration;

/// What one crawl run did
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Top story ids returned by the remote list
    pub stories_requested: usize,

    /// Stories normalized and persisted
    pub stories_written: usize,

    /// Stories that were absent, failed to fetch, or were not stories
    pub stories_skipped: usize,

    /// Article pages extracted and persisted
    pub articles_written: usize,

    /// Comment collection counters summed over every story
    pub comments: CollectStats,

    pub elapsed: Duration,
}

impl RunSummary {
    /// Logs the summary at info level
    pub fn log(&self) {
        tracing::info!(
            "Crawl completed: {} stories written, {} skipped, {} new comments in {:?}",
            self.stories_written,
            self.stories_skipped,
            self.comments.emitted,
            self.elapsed
        );
        tracing::debug!("Comment counters: {:?}", self.comments);
    }
}

/// Aggregate view of a frontier cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontierStatistics {
    pub stories: usize,

    /// Ids recorded across every story and depth
    pub total_seen: usize,

    /// Depth to number of ids recorded at that depth
    pub seen_by_depth: BTreeMap<u32, usize>,

    /// Most recent `updatedISO` among entries
    pub last_updated: Option<String>,
}

/// Summarizes a frontier cache
pub fn load_statistics(cache: &FrontierCache) -> FrontierStatistics {
    let mut stats = FrontierStatistics {
        stories: cache.len(),
        ..FrontierStatistics::default()
    };

    for (_, entry) in cache.iter() {
        for (depth, ids) in &entry.seen_by_depth {
            *stats.seen_by_depth.entry(*depth).or_insert(0) += ids.len();
            stats.total_seen += ids.len();
        }
        // ISO-8601 UTC strings order chronologically
        if !entry.updated_iso.is_empty()
            && stats.last_updated.as_deref() < Some(entry.updated_iso.as_str())
        {
            stats.last_updated = Some(entry.updated_iso.clone());
        }
    }
    stats
}

/// Prints frontier statistics to stdout
pub fn print_statistics(stats: &FrontierStatistics) {
    println!("=== Frontier Statistics ===\n");

    println!("Overview:");
    println!("  Stories tracked: {}", stats.stories);
    println!("  Comment ids seen: {}", stats.total_seen);
    if let Some(updated) = &stats.last_updated {
        println!("  Last updated: {}", updated);
    }
    println!();

    if !stats.seen_by_depth.is_empty() {
        println!("Ids by Depth:");
        for (depth, count) in &stats.seen_by_depth {
            let percentage = if stats.total_seen > 0 {
                (*count as f64 / stats.total_seen as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", depth, count, percentage);
        }
    }
}

/// Prints a run summary to stdout
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Stories:");
    println!("  Requested: {}", summary.stories_requested);
    println!("  Written: {}", summary.stories_written);
    println!("  Skipped: {}", summary.stories_skipped);
    if summary.articles_written > 0 {
        println!("  Articles: {}", summary.articles_written);
    }
    println!();

    let c = &summary.comments;
    println!("Comments:");
    println!("  New: {}", c.emitted);
    println!("  Fetched: {}", c.fetched());
    println!("  Empty bodies: {}", c.empty_body);
    println!("  Missing or invalid: {}", c.absent);
    println!("  Skipped (already seen): {}", c.frontier_skipped);
    if c.fetch_errors > 0 {
        println!("  Fetch errors: {}", c.fetch_errors);
    }
    println!();

    println!("Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
}
