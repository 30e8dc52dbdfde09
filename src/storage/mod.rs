//! Storage module for persisting crawl artifacts
//!
//! This module handles all on-disk output of the crawler, including:
//! - Normalized story records
//! - Per-story comment lists, merged across runs
//! - Extracted article text
//! - The run index
//! - Atomic JSON writes shared with the frontier cache

mod files;
pub(crate) mod json;
mod traits;

pub(crate) use files::now_iso;
pub use files::JsonStorage;
pub use json::{read_json, write_json_atomic};
pub use traits::{Storage, StorageError, StorageResult};

use crate::item::NormalizedComment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Opens the artifact storage rooted at `data_dir`
pub fn open_storage(data_dir: &Path) -> JsonStorage {
    JsonStorage::new(data_dir)
}

/// Contents of `index.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    #[serde(rename = "updatedISO")]
    pub updated_iso: String,
    pub story_ids: Vec<u64>,
}

/// Merges newly collected comments into a previously persisted list
///
/// Prior order is kept; a comment present in both takes the fresh version,
/// and unseen ids are appended in collection order.
pub fn merge_comments(
    prior: Vec<NormalizedComment>,
    fresh: &[NormalizedComment],
) -> Vec<NormalizedComment> {
    let mut merged = prior;
    let positions: HashMap<u64, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    for comment in fresh {
        match positions.get(&comment.id) {
            Some(&i) => merged[i] = comment.clone(),
            None => merged.push(comment.clone()),
        }
    }
    merged
}
