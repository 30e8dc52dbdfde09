//! Crawler module for fetching and collecting stories and comments
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry, backoff and a shared in-flight limit
//! - The remote item client
//! - HTML to plain text conversion
//! - Bounded breadth-first comment collection
//! - Overall crawl coordination

mod client;
mod collector;
mod coordinator;
mod parser;
mod transport;

pub use client::{HnClient, ItemSource};
pub use collector::{
    collect_comments, CollectOutcome, CollectStats, CrawlBudget, DEFAULT_BATCH_PAUSE,
    DEFAULT_MAX_BODY_CHARS,
};
pub use coordinator::{run_crawl, Coordinator};
pub use parser::{article_text, clamp, html_to_plain};
pub use transport::{build_http_client, HttpClient, RetryPolicy};

use crate::config::Config;
use crate::output::RunSummary;
use crate::DistillError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP transport and item client
/// 2. Load the frontier cache unless `fresh` is set
/// 3. Fetch the top stories and collect their new comments
/// 4. Write per-story artifacts, the run index and the updated cache
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed
/// * `Err(DistillError)` - Crawl failed
pub async fn crawl(config: Config, fresh: bool) -> Result<RunSummary, DistillError> {
    run_crawl(config, fresh).await
}
