//! Per-item outcome tracking for comment collection
//!
//! Every id the collector dequeues ends in exactly one of these states.

use std::fmt;

/// What happened to one dequeued comment id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    // ===== Success =====
    /// Fetched, valid, non-empty body and emitted as a comment
    Emitted,

    // ===== Explored but not emitted =====
    /// Valid comment whose plain-text body came out empty; its children
    /// are still explored
    EmptyBody,

    /// Emission skipped because the comment budget was already spent
    OverBudget,

    // ===== Dropped =====
    /// Fetch failed, the item was `null`, or the payload failed validation
    Absent,

    /// Valid payload that is not a comment
    WrongKind,
}

impl ItemState {
    /// Returns true if the item's children may still be enqueued
    pub fn explores_children(&self) -> bool {
        matches!(self, Self::Emitted | Self::EmptyBody | Self::OverBudget)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emitted => "emitted",
            Self::EmptyBody => "empty_body",
            Self::OverBudget => "over_budget",
            Self::Absent => "absent",
            Self::WrongKind => "wrong_kind",
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
