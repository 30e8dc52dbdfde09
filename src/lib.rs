//! hn-distill: an incremental Hacker News crawler
//!
//! This crate crawls the public Hacker News item API, normalizes stories and
//! their comment trees, and persists per-story artifacts plus a frontier
//! cache that lets later runs skip comment branches they have already seen.

pub mod config;
pub mod crawler;
pub mod item;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for hn-distill operations
#[derive(Debug, Error)]
pub enum DistillError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Story normalization error: {0}")]
    Normalize(#[from] item::NormalizeError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors surfaced by the retrying HTTP transport
///
/// Every variant carries the requested URL; `Status` also carries the HTTP
/// status code of the final attempt.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Request timeout after {timeout_ms}ms for {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Request limiter closed while fetching {url}")]
    LimiterClosed { url: String },
}

impl HttpError {
    /// The URL of the request that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url, .. }
            | Self::Transport { url, .. }
            | Self::Decode { url, .. }
            | Self::LimiterClosed { url } => url,
        }
    }

    /// The HTTP status code, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for hn-distill operations
pub type Result<T> = std::result::Result<T, DistillError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for transport operations
pub type HttpResult<T> = std::result::Result<T, HttpError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{collect_comments, CollectOutcome, CrawlBudget, HnClient, ItemSource};
pub use item::{NormalizedComment, NormalizedStory, RemoteNode};
pub use output::RunSummary;
pub use state::{FrontierCache, FrontierEntry, SeenByDepth};
pub use storage::{JsonStorage, Storage};
