//! Atomic JSON file helpers
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write never leaves a truncated artifact behind.

use crate::storage::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Serializes `value` as pretty JSON and atomically replaces `path`
///
/// Parent directories are created as needed. Returns `false` without
/// touching the file when its current content is already identical.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<bool> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes_atomic(path, &bytes)
}

/// Atomically replaces `path` with `bytes`, skipping identical content
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> StorageResult<bool> {
    if let Ok(existing) = fs::read(path) {
        if existing == bytes {
            return Ok(false);
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, bytes).map_err(|e| StorageError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StorageError::io(path, e));
    }
    Ok(true)
}

/// Reads and decodes `path`
///
/// A missing file is `Ok(None)`; unreadable or undecodable content is an error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, e)),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}.tmp", std::process::id()));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c.json");

        assert!(write_json_atomic(&path, &json!({"k": [1, 2]})).unwrap());
        let value: serde_json::Value = read_json(&path).unwrap().unwrap();
        assert_eq!(value, json!({"k": [1, 2]}));
    }

    #[test]
    fn test_identical_content_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("same.json");

        assert!(write_json_atomic(&path, &json!([1])).unwrap());
        assert!(!write_json_atomic(&path, &json!([1])).unwrap());
        assert!(write_json_atomic(&path, &json!([2])).unwrap());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.json");
        write_json_atomic(&path, &json!({})).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("x.json")]);
    }

    #[test]
    fn test_read_missing_and_corrupt() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(read_json::<serde_json::Value>(&missing).unwrap().is_none());

        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{not json").unwrap();
        assert!(matches!(
            read_json::<serde_json::Value>(&corrupt),
            Err(StorageError::Serialization(_))
        ));
    }
}
