//! Normalized comment record

use serde::{Deserialize, Serialize};

/// One comment as emitted by a collection run
///
/// Created once per successful, non-empty fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedComment {
    pub id: u64,
    pub by: String,
    #[serde(rename = "timeISO")]
    pub time_iso: String,
    /// Plain-text body, HTML stripped and length-clamped
    pub text_plain: String,
    pub parent: u64,
    /// 1 for top-level comments
    pub depth: u32,
}
