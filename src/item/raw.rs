//! Raw item shape returned by the remote API
//!
//! Payloads come from a service we do not control, so they are decoded
//! through a strict schema. Anything that does not fit is reported as an
//! [`InvalidNode`] and treated by callers exactly like a missing item.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The kinds of remote item the crawler understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    Comment,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Story => write!(f, "story"),
            Self::Comment => write!(f, "comment"),
        }
    }
}

/// One node of the remote story/comment tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteNode {
    pub id: u64,

    #[serde(rename = "type")]
    pub kind: ItemKind,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    /// Author name
    #[serde(default)]
    pub by: Option<String>,

    #[serde(default)]
    pub score: Option<i64>,

    #[serde(default)]
    pub descendants: Option<u64>,

    /// Seconds since the Unix epoch
    pub time: u64,

    #[serde(default)]
    pub kids: Option<Vec<u64>>,

    #[serde(default)]
    pub parent: Option<u64>,
}

/// A payload that does not match the [`RemoteNode`] schema
#[derive(Debug, Error)]
#[error("invalid item payload: {reason}")]
pub struct InvalidNode {
    pub reason: String,
}

impl RemoteNode {
    /// Validates a decoded JSON payload against the node schema
    ///
    /// `null`, non-objects, unknown `type` values, missing `id`/`type`/`time`
    /// and mistyped fields are all rejected.
    pub fn validate(value: Value) -> Result<Self, InvalidNode> {
        if !value.is_object() {
            return Err(InvalidNode {
                reason: format!("expected an object, got {}", json_kind(&value)),
            });
        }
        serde_json::from_value(value).map_err(|e| InvalidNode {
            reason: e.to_string(),
        })
    }

    /// Child ids, empty when the node has none
    pub fn child_ids(&self) -> &[u64] {
        self.kids.as_deref().unwrap_or(&[])
    }

    pub fn is_comment(&self) -> bool {
        self.kind == ItemKind::Comment
    }

    pub fn is_story(&self) -> bool {
        self.kind == ItemKind::Story
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
