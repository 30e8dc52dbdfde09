use serde::Deserialize;

/// Statuses retried by default: request timeout, too early, rate limiting,
/// and the transient 5xx family (including Cloudflare's 522).
pub const DEFAULT_RETRY_STATUSES: [u16; 8] = [408, 425, 429, 500, 502, 503, 504, 522];

/// Main configuration structure for hn-distill
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of top stories to crawl per run
    pub top_n: usize,

    /// Maximum comment depth below a story (top-level comments are depth 1)
    pub max_depth: u32,

    /// Maximum number of comments collected per story per run
    pub max_comments_per_story: usize,

    /// Maximum number of simultaneously in-flight requests
    pub concurrency: usize,

    /// Comment bodies are clamped to this many characters
    pub max_body_chars: usize,

    /// Pause between comment fetch batches (milliseconds)
    pub batch_pause_ms: u64,

    /// Whether to fetch and store the linked article text for each story
    pub fetch_articles: bool,

    /// Article text is clamped to this many characters
    pub article_slice_chars: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            top_n: 40,
            max_depth: 2,
            max_comments_per_story: 40,
            concurrency: 8,
            max_body_chars: 2000,
            batch_pause_ms: 50,
            fetch_articles: false,
            article_slice_chars: 6000,
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Base URL of the item API (without trailing slash)
    pub base_url: String,

    /// Per-attempt timeout (milliseconds)
    pub timeout_ms: u64,

    /// Additional attempts after the first one
    pub retries: u32,

    /// Base backoff, doubled per attempt (milliseconds)
    pub backoff_ms: u64,

    /// Backoff ceiling (milliseconds)
    pub max_backoff_ms: u64,

    /// Status codes that are retried
    pub retry_statuses: Vec<u16>,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hacker-news.firebaseio.com/v0".to_string(),
            timeout_ms: 15_000,
            retries: 3,
            backoff_ms: 600,
            max_backoff_ms: 5_000,
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
            user_agent: "hn-distill/1.0 (+https://github.com/hn-distill)".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory for all persisted artifacts
    pub data_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}
