//! Item records: raw remote nodes and their normalized forms
//!
//! - `RemoteNode`: strictly validated payload of one API item
//! - `NormalizedStory`: canonical story record plus the story normalizer
//! - `NormalizedComment`: one emitted comment

mod comment;
mod raw;
mod story;

pub use comment::NormalizedComment;
pub use raw::{InvalidNode, ItemKind, RemoteNode};
pub use story::{normalize_story, NormalizeError, NormalizedStory, MAX_TITLE_CHARS};

pub(crate) use story::DEFAULT_AUTHOR;

use chrono::{DateTime, SecondsFormat, Utc};

/// Author names longer than this are truncated
pub const MAX_AUTHOR_CHARS: usize = 80;

/// Formats epoch seconds as an ISO-8601 UTC timestamp with milliseconds
///
/// Out-of-range values clamp to the epoch.
pub fn iso_from_epoch(secs: u64) -> String {
    let timestamp = i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
