//! Comment collector: bounded breadth-first traversal of one story's comments
//!
//! The traversal fetches comments in batches of at most `concurrency` ids,
//! stops once `max_count` comments have been emitted, never descends past
//! `max_depth`, and skips any child id the caller's frontier has already
//! seen at that child's depth. It never mutates the frontier itself; the
//! ids it visits come back as `all_seen_by_depth` for the caller to merge.

use crate::config::CrawlerConfig;
use crate::crawler::client::ItemSource;
use crate::crawler::parser::{clamp, html_to_plain};
use crate::item::{iso_from_epoch, NormalizedComment, RemoteNode, DEFAULT_AUTHOR, MAX_AUTHOR_CHARS};
use crate::state::{ItemState, SeenByDepth};
use crate::{ConfigError, ConfigResult};
use futures::future::join_all;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::time::Duration;

/// Pause between batches unless configured otherwise
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_millis(50);

/// Comment bodies are clamped to this many characters unless configured otherwise
pub const DEFAULT_MAX_BODY_CHARS: usize = 2000;

/// Limits for one collection
///
/// Construction rejects zero limits, so a collection never starts with a
/// budget it cannot make progress under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlBudget {
    max_depth: u32,
    max_count: usize,
    concurrency: usize,
    max_body_chars: usize,
    batch_pause: Duration,
}

impl CrawlBudget {
    pub fn new(max_depth: u32, max_count: usize, concurrency: usize) -> ConfigResult<Self> {
        if max_depth == 0 {
            return Err(ConfigError::Validation(
                "crawl budget max_depth must be at least 1".to_string(),
            ));
        }
        if max_count == 0 {
            return Err(ConfigError::Validation(
                "crawl budget max_count must be at least 1".to_string(),
            ));
        }
        if concurrency == 0 {
            return Err(ConfigError::Validation(
                "crawl budget concurrency must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            max_depth,
            max_count,
            concurrency,
            max_body_chars: DEFAULT_MAX_BODY_CHARS,
            batch_pause: DEFAULT_BATCH_PAUSE,
        })
    }

    /// Budget for one story from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> ConfigResult<Self> {
        Self::new(
            config.max_depth,
            config.max_comments_per_story,
            config.concurrency,
        )?
        .with_max_body_chars(config.max_body_chars)
        .map(|budget| budget.with_batch_pause(Duration::from_millis(config.batch_pause_ms)))
    }

    pub fn with_max_body_chars(mut self, max_body_chars: usize) -> ConfigResult<Self> {
        if max_body_chars == 0 {
            return Err(ConfigError::Validation(
                "crawl budget max_body_chars must be at least 1".to_string(),
            ));
        }
        self.max_body_chars = max_body_chars;
        Ok(self)
    }

    pub fn with_batch_pause(mut self, batch_pause: Duration) -> Self {
        self.batch_pause = batch_pause;
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn max_body_chars(&self) -> usize {
        self.max_body_chars
    }

    pub fn batch_pause(&self) -> Duration {
        self.batch_pause
    }
}

/// Counters for one or more collections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub emitted: usize,
    pub empty_body: usize,
    pub over_budget: usize,
    pub absent: usize,
    pub wrong_kind: usize,
    /// Ids dropped because this run already queued or visited them
    pub duplicate: usize,
    /// Ids dropped because the frontier already saw them at that depth
    pub frontier_skipped: usize,
    /// Subset of `absent` caused by transport failures
    pub fetch_errors: usize,
}

impl CollectStats {
    fn record(&mut self, state: ItemState) {
        match state {
            ItemState::Emitted => self.emitted += 1,
            ItemState::EmptyBody => self.empty_body += 1,
            ItemState::OverBudget => self.over_budget += 1,
            ItemState::Absent => self.absent += 1,
            ItemState::WrongKind => self.wrong_kind += 1,
        }
    }

    /// Number of ids that were fetched
    pub fn fetched(&self) -> usize {
        self.emitted + self.empty_body + self.over_budget + self.absent + self.wrong_kind
    }

    /// Adds another collection's counters to these
    pub fn absorb(&mut self, other: &CollectStats) {
        self.emitted += other.emitted;
        self.empty_body += other.empty_body;
        self.over_budget += other.over_budget;
        self.absent += other.absent;
        self.wrong_kind += other.wrong_kind;
        self.duplicate += other.duplicate;
        self.frontier_skipped += other.frontier_skipped;
        self.fetch_errors += other.fetch_errors;
    }
}

/// Result of one collection
#[derive(Debug, Clone, Default)]
pub struct CollectOutcome {
    /// Emitted comments in traversal order, at most `max_count` of them
    pub comments: Vec<NormalizedComment>,

    /// Every id visited this run, keyed by the depth it was visited at
    pub all_seen_by_depth: SeenByDepth,

    pub stats: CollectStats,
}

#[derive(Debug, Clone, Copy)]
struct QueuedItem {
    id: u64,
    depth: u32,
    /// Id of the node whose `kids` listed this one; `None` for roots
    via: Option<u64>,
}

/// Collects the comment tree under `root_ids`
///
/// Roots are depth 1. An id is recorded in `all_seen_by_depth` as soon as it
/// is taken off the queue, before its fetch resolves, so ids that turn out
/// missing or empty are remembered too. Fetch failures and malformed items
/// are absorbed as absent and never abort the collection.
pub async fn collect_comments<S>(
    source: &S,
    root_ids: &[u64],
    budget: &CrawlBudget,
    seen_by_depth: &SeenByDepth,
) -> CollectOutcome
where
    S: ItemSource + ?Sized,
{
    let no_ids = BTreeSet::new();
    let mut queue: VecDeque<QueuedItem> = VecDeque::new();
    let mut enqueued: HashSet<u64> = HashSet::new();
    let mut visited: HashSet<u64> = HashSet::new();
    let mut outcome = CollectOutcome::default();

    let seen_roots = seen_by_depth.get(&1).unwrap_or(&no_ids);
    for &id in root_ids {
        if seen_roots.contains(&id) {
            outcome.stats.frontier_skipped += 1;
        } else if !enqueued.insert(id) {
            outcome.stats.duplicate += 1;
        } else {
            queue.push_back(QueuedItem {
                id,
                depth: 1,
                via: None,
            });
        }
    }

    while !queue.is_empty() && outcome.comments.len() < budget.max_count {
        let take = budget.concurrency.min(queue.len());
        let mut batch = Vec::with_capacity(take);
        for item in queue.drain(..take) {
            if !visited.insert(item.id) {
                outcome.stats.duplicate += 1;
                continue;
            }
            outcome
                .all_seen_by_depth
                .entry(item.depth)
                .or_default()
                .insert(item.id);
            batch.push(item);
        }

        let results = join_all(batch.iter().map(|item| source.fetch_item(item.id))).await;

        // Emit first, then expand, so the queue budget sees this batch's output
        let mut expandable: Vec<(QueuedItem, RemoteNode)> = Vec::new();
        for (item, result) in batch.into_iter().zip(results) {
            let node = match result {
                Ok(Some(node)) => node,
                Ok(None) => {
                    outcome.stats.record(ItemState::Absent);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Comment {} fetch failed: {}", item.id, e);
                    outcome.stats.fetch_errors += 1;
                    outcome.stats.record(ItemState::Absent);
                    continue;
                }
            };

            if !node.is_comment() {
                tracing::debug!("Item {} is a {}, not a comment", node.id, node.kind);
                outcome.stats.record(ItemState::WrongKind);
                continue;
            }

            let state = match normalize_comment(&node, &item, budget.max_body_chars) {
                None => ItemState::EmptyBody,
                Some(_) if outcome.comments.len() >= budget.max_count => ItemState::OverBudget,
                Some(comment) => {
                    outcome.comments.push(comment);
                    ItemState::Emitted
                }
            };
            tracing::trace!("Comment {} at depth {}: {}", item.id, item.depth, state);
            outcome.stats.record(state);

            if state.explores_children() {
                expandable.push((item, node));
            }
        }

        for (item, node) in &expandable {
            if item.depth >= budget.max_depth {
                continue;
            }
            let depth = item.depth + 1;
            let seen_here = seen_by_depth.get(&depth).unwrap_or(&no_ids);

            for &child in node.child_ids() {
                if outcome.comments.len() + queue.len() >= budget.max_count {
                    break;
                }
                if seen_here.contains(&child) {
                    outcome.stats.frontier_skipped += 1;
                } else if !enqueued.insert(child) {
                    outcome.stats.duplicate += 1;
                } else {
                    queue.push_back(QueuedItem {
                        id: child,
                        depth,
                        via: Some(node.id),
                    });
                }
            }
        }

        if !queue.is_empty()
            && outcome.comments.len() < budget.max_count
            && !budget.batch_pause.is_zero()
        {
            tokio::time::sleep(budget.batch_pause).await;
        }
    }

    outcome.comments.truncate(budget.max_count);
    outcome
}

/// Builds the emitted form of a comment node, `None` when its body is empty
fn normalize_comment(
    node: &RemoteNode,
    item: &QueuedItem,
    max_body_chars: usize,
) -> Option<NormalizedComment> {
    let text_plain = clamp(
        &html_to_plain(node.text.as_deref().unwrap_or_default()),
        max_body_chars,
    );
    if text_plain.is_empty() {
        return None;
    }

    let by = node
        .by
        .as_deref()
        .filter(|b| !b.is_empty())
        .unwrap_or(DEFAULT_AUTHOR);

    Some(NormalizedComment {
        id: node.id,
        by: clamp(by, MAX_AUTHOR_CHARS),
        time_iso: iso_from_epoch(node.time),
        text_plain,
        parent: node.parent.or(item.via).unwrap_or(0),
        depth: item.depth,
    })
}
