//! Filesystem storage backend
//!
//! Artifacts live under one data directory:
//!
//! ```text
//! {data_dir}/raw/items/{id}.json      normalized story
//! {data_dir}/raw/comments/{id}.json   comment list
//! {data_dir}/raw/articles/{id}.md     extracted article text
//! {data_dir}/index.json               stories written by the last run
//! {data_dir}/cache/frontier.json      frontier cache
//! ```

use crate::item::{NormalizedComment, NormalizedStory};
use crate::storage::json::{read_json, write_bytes_atomic, write_json_atomic};
use crate::storage::{IndexRecord, Storage, StorageResult};
use std::path::{Path, PathBuf};

/// JSON-file storage rooted at a data directory
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn story_path(&self, story_id: u64) -> PathBuf {
        self.root.join("raw/items").join(format!("{}.json", story_id))
    }

    pub fn comments_path(&self, story_id: u64) -> PathBuf {
        self.root
            .join("raw/comments")
            .join(format!("{}.json", story_id))
    }

    pub fn article_path(&self, story_id: u64) -> PathBuf {
        self.root.join("raw/articles").join(format!("{}.md", story_id))
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }
}

impl Storage for JsonStorage {
    fn write_story(&mut self, story: &NormalizedStory) -> StorageResult<bool> {
        write_json_atomic(&self.story_path(story.id), story)
    }

    fn read_story(&self, story_id: u64) -> StorageResult<Option<NormalizedStory>> {
        read_json(&self.story_path(story_id))
    }

    fn read_comments(&self, story_id: u64) -> StorageResult<Vec<NormalizedComment>> {
        let path = self.comments_path(story_id);
        match read_json::<Vec<NormalizedComment>>(&path) {
            Ok(comments) => Ok(comments.unwrap_or_default()),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable comments for story {} at {}: {}",
                    story_id,
                    path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    fn write_comments(
        &mut self,
        story_id: u64,
        comments: &[NormalizedComment],
    ) -> StorageResult<bool> {
        write_json_atomic(&self.comments_path(story_id), comments)
    }

    fn write_article(&mut self, story_id: u64, text: &str) -> StorageResult<bool> {
        write_bytes_atomic(&self.article_path(story_id), text.as_bytes())
    }

    fn write_index(&mut self, story_ids: &[u64]) -> StorageResult<()> {
        let record = IndexRecord {
            updated_iso: now_iso(),
            story_ids: story_ids.to_vec(),
        };
        write_json_atomic(&self.index_path(), &record)?;
        Ok(())
    }

    fn frontier_path(&self) -> PathBuf {
        self.root.join("cache/frontier.json")
    }
}

/// Current UTC time in the artifact timestamp format
pub(crate) fn now_iso() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
