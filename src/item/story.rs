//! Story normalization
//!
//! Turns a validated story node into the canonical story record.

use crate::crawler::clamp;
use crate::item::raw::{ItemKind, RemoteNode};
use crate::item::{iso_from_epoch, MAX_AUTHOR_CHARS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Titles longer than this are truncated
pub const MAX_TITLE_CHARS: usize = 500;

const DEFAULT_TITLE: &str = "(untitled)";
pub(crate) const DEFAULT_AUTHOR: &str = "unknown";

/// Canonical record for one story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStory {
    pub id: u64,
    pub title: String,
    /// Absolute http(s) URL of the linked article, if any
    pub url: Option<String>,
    pub by: String,
    #[serde(rename = "timeISO")]
    pub time_iso: String,
    /// Top-level comment ids in remote order
    pub comment_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descendants: Option<u64>,
}

/// Errors from story normalization
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("item {id} is a {kind}, not a story")]
    NotAStory { id: u64, kind: ItemKind },
}

/// Validates and reshapes a raw story item
///
/// Missing titles and authors get placeholder values, long ones are clamped,
/// and the URL is kept only when it parses as an absolute http(s) URL.
pub fn normalize_story(raw: &RemoteNode) -> Result<NormalizedStory, NormalizeError> {
    if !raw.is_story() {
        return Err(NormalizeError::NotAStory {
            id: raw.id,
            kind: raw.kind,
        });
    }

    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE);

    let by = raw
        .by
        .as_deref()
        .filter(|b| !b.is_empty())
        .unwrap_or(DEFAULT_AUTHOR);

    Ok(NormalizedStory {
        id: raw.id,
        title: clamp(title, MAX_TITLE_CHARS),
        url: raw.url.as_deref().and_then(normalize_story_url),
        by: clamp(by, MAX_AUTHOR_CHARS),
        time_iso: iso_from_epoch(raw.time),
        comment_ids: raw.child_ids().to_vec(),
        score: raw.score,
        descendants: raw.descendants,
    })
}

fn normalize_story_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}
