//! Output module for crawl summaries and reports
//!
//! This module handles:
//! - The per-run summary returned by the crawl driver
//! - Frontier cache statistics

pub mod stats;

pub use stats::{
    load_statistics, print_run_summary, print_statistics, FrontierStatistics, RunSummary,
};
