//! Storage traits and error types
//!
//! This module defines the trait interface for artifact storage backends and
//! associated error types.

use crate::item::{NormalizedComment, NormalizedStory};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for artifact storage backend implementations
///
/// Write methods return `true` when the artifact changed on disk and `false`
/// when identical content was already present.
pub trait Storage {
    // ===== Stories =====

    /// Persists a normalized story record
    fn write_story(&mut self, story: &NormalizedStory) -> StorageResult<bool>;

    /// Reads a previously persisted story record
    fn read_story(&self, story_id: u64) -> StorageResult<Option<NormalizedStory>>;

    // ===== Comments =====

    /// Reads the persisted comment list for a story
    ///
    /// Missing or unreadable artifacts yield an empty list.
    fn read_comments(&self, story_id: u64) -> StorageResult<Vec<NormalizedComment>>;

    /// Replaces the persisted comment list for a story
    fn write_comments(
        &mut self,
        story_id: u64,
        comments: &[NormalizedComment],
    ) -> StorageResult<bool>;

    // ===== Articles =====

    /// Persists extracted article text for a story
    fn write_article(&mut self, story_id: u64, text: &str) -> StorageResult<bool>;

    // ===== Run artifacts =====

    /// Writes the index of stories produced by the current run
    fn write_index(&mut self, story_ids: &[u64]) -> StorageResult<()>;

    /// Location of the persisted frontier cache
    fn frontier_path(&self) -> PathBuf;
}
