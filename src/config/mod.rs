//! Configuration module for hn-distill
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section and key is optional; omitted values take their defaults.
//!
//! # Example
//!
//! ```no_run
//! use hn_distill::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("hn-distill.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig, DEFAULT_RETRY_STATUSES};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
