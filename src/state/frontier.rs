//! Frontier cache: which comment ids each story has already seen, per depth
//!
//! The cache is the only cross-run "seen" state. It is read once at startup,
//! merged into after each story is collected, and written once at the end
//! of a run. Growth is monotonic: merges only ever add ids.

use crate::storage::{now_iso, write_json_atomic, StorageResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Depth (1 = top-level comment) to the ids seen at that depth
pub type SeenByDepth = BTreeMap<u32, BTreeSet<u64>>;

/// Cross-run state for one story
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontierEntry {
    /// Top-level comment ids as of the last crawl
    #[serde(default, alias = "seenKids")]
    pub seen_top_level: BTreeSet<u64>,

    #[serde(default)]
    pub seen_by_depth: SeenByDepth,

    #[serde(default, rename = "updatedISO")]
    pub updated_iso: String,
}

impl FrontierEntry {
    /// Total number of ids recorded across all depths
    pub fn seen_count(&self) -> usize {
        self.seen_by_depth.values().map(BTreeSet::len).sum()
    }

    /// Deepest level with any recorded id
    pub fn max_depth(&self) -> Option<u32> {
        self.seen_by_depth
            .iter()
            .rev()
            .find(|(_, ids)| !ids.is_empty())
            .map(|(depth, _)| *depth)
    }

    /// Reads one persisted entry, accepting current and legacy shapes
    ///
    /// A bare array is the legacy list of seen top-level ids. Objects may
    /// use `seenKids` for `seenTopLevel`. Missing fields default to empty,
    /// and ids or depth keys of the wrong type are dropped.
    fn migrate(value: &Value) -> Option<Self> {
        match value {
            Value::Array(ids) => Some(Self {
                seen_top_level: id_set(ids),
                ..Self::default()
            }),
            Value::Object(fields) => Some(Self {
                seen_top_level: fields
                    .get("seenTopLevel")
                    .or_else(|| fields.get("seenKids"))
                    .and_then(Value::as_array)
                    .map(|ids| id_set(ids))
                    .unwrap_or_default(),
                seen_by_depth: fields
                    .get("seenByDepth")
                    .and_then(Value::as_object)
                    .map(depth_map)
                    .unwrap_or_default(),
                updated_iso: fields
                    .get("updatedISO")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            _ => None,
        }
    }
}

fn id_set(values: &[Value]) -> BTreeSet<u64> {
    values.iter().filter_map(Value::as_u64).collect()
}

fn depth_map(fields: &Map<String, Value>) -> SeenByDepth {
    fields
        .iter()
        .filter_map(|(depth, ids)| {
            let depth = depth.parse::<u32>().ok()?;
            let ids = id_set(ids.as_array()?);
            Some((depth, ids))
        })
        .collect()
}

/// The persisted story id to [`FrontierEntry`] mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrontierCache {
    entries: BTreeMap<u64, FrontierEntry>,
}

impl FrontierCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the cache file at `path`
    ///
    /// Never fails: a missing file is an empty cache, and an unreadable or
    /// corrupt file is logged and treated as empty.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No frontier cache at {}, starting empty", path.display());
                return Self::new();
            }
            Err(e) => {
                tracing::warn!("Cannot read frontier cache {}: {}", path.display(), e);
                return Self::new();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                let cache = Self::from_value(&value);
                tracing::debug!(
                    "Loaded frontier cache for {} stories from {}",
                    cache.len(),
                    path.display()
                );
                cache
            }
            Err(e) => {
                tracing::warn!("Corrupt frontier cache {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Builds a cache from decoded JSON, migrating legacy entry shapes
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            tracing::warn!("Frontier cache is not a JSON object, ignoring it");
            return Self::new();
        };

        let mut entries = BTreeMap::new();
        for (key, raw) in object {
            let Ok(story_id) = key.parse::<u64>() else {
                tracing::warn!("Skipping frontier entry with non-numeric key {:?}", key);
                continue;
            };
            match FrontierEntry::migrate(raw) {
                Some(entry) => {
                    entries.insert(story_id, entry);
                }
                None => tracing::warn!("Skipping malformed frontier entry for story {}", story_id),
            }
        }
        Self { entries }
    }

    pub fn get(&self, story_id: u64) -> Option<&FrontierEntry> {
        self.entries.get(&story_id)
    }

    /// The ids already seen for a story, empty when the story is new
    pub fn seen_by_depth(&self, story_id: u64) -> SeenByDepth {
        self.entries
            .get(&story_id)
            .map(|e| e.seen_by_depth.clone())
            .unwrap_or_default()
    }

    /// Merges one collection's discoveries into a story's entry
    ///
    /// Every set becomes the union of its prior content and the new ids.
    pub fn merge(&mut self, story_id: u64, top_level: &[u64], delta: &SeenByDepth) -> &FrontierEntry {
        let entry = self.entries.entry(story_id).or_default();
        entry.seen_top_level.extend(top_level.iter().copied());
        for (depth, ids) in delta {
            if ids.is_empty() {
                continue;
            }
            entry
                .seen_by_depth
                .entry(*depth)
                .or_default()
                .extend(ids.iter().copied());
        }
        entry.updated_iso = now_iso();
        entry
    }

    /// Atomically writes the cache to `path`
    pub fn save(&self, path: &Path) -> StorageResult<bool> {
        write_json_atomic(path, self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u64, &FrontierEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
