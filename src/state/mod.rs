//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `FrontierCache`: persisted per-story, per-depth record of seen comment ids
//! - `ItemState`: the outcome of one dequeued comment id within a run

mod frontier;
mod item_state;

// Re-export main types
pub use frontier::{FrontierCache, FrontierEntry, SeenByDepth};
pub use item_state::ItemState;
