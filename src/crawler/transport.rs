//! Retrying HTTP transport
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the configured user agent
//! - Per-attempt timeouts covering both the request and the body
//! - Retry with exponential backoff and jitter on transient failures
//! - A global limiter bounding the number of in-flight requests
//! - Error classification into [`HttpError`]

use crate::config::{CrawlerConfig, HttpConfig};
use crate::{HttpError, HttpResult};
use rand::Rng;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Upper bound of the random jitter added to each backoff (milliseconds)
const JITTER_MS: u64 = 120;

/// At most this many bytes of an error body are kept in [`HttpError::Status`]
const ERROR_BODY_CHARS: usize = 500;

/// Retry and timeout settings for one transport
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub retries: u32,

    /// Backoff before retry `n` is `base_backoff * 2^n` plus jitter
    pub base_backoff: Duration,

    /// Ceiling applied after jitter
    pub max_backoff: Duration,

    /// Deadline for one attempt, response body included
    pub timeout: Duration,

    /// Status codes worth another attempt
    pub retry_statuses: Vec<u16>,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            retries: config.retries,
            base_backoff: Duration::from_millis(config.backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            timeout: Duration::from_millis(config.timeout_ms),
            retry_statuses: config.retry_statuses.clone(),
        }
    }

    /// Whether a response with this status should be retried
    pub fn is_retriable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Delay before the retry that follows attempt `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..JITTER_MS));
        let exponential = self
            .base_backoff
            .saturating_mul(2u32.saturating_pow(attempt));
        exponential.saturating_add(jitter).min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

impl HttpError {
    /// Whether this failure is transient under `policy`
    ///
    /// Network errors and timeouts are always transient; HTTP statuses are
    /// transient when listed in the policy; undecodable bodies never are.
    pub fn is_retriable(&self, policy: &RetryPolicy) -> bool {
        match self {
            Self::Status { status, .. } => policy.is_retriable_status(*status),
            Self::Timeout { .. } => true,
            Self::Transport { source, .. } => !source.is_builder(),
            Self::Decode { .. } | Self::LimiterClosed { .. } => false,
        }
    }
}

/// Builds the underlying HTTP client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_millis(config.timeout_ms))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP client with retry, backoff, timeout and a shared in-flight limit
///
/// Cloning is cheap and clones share the same limiter, so every request made
/// by the crawl (stories and comments alike) counts against one budget.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
    limiter: Arc<Semaphore>,
}

impl HttpClient {
    /// Creates a transport from configuration
    pub fn from_config(http: &HttpConfig, crawler: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(http)?;
        Ok(Self::new(
            client,
            RetryPolicy::from_config(http),
            crawler.concurrency,
        ))
    }

    pub fn new(client: Client, policy: RetryPolicy, max_in_flight: usize) -> Self {
        Self {
            client,
            policy,
            limiter: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url` and decodes the body as JSON
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> HttpResult<T> {
        let body = self.fetch_with_retry(url, true).await?;
        serde_json::from_str(&body).map_err(|source| HttpError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Fetches `url` and returns the body as text
    pub async fn fetch_text(&self, url: &str) -> HttpResult<String> {
        self.fetch_with_retry(url, false).await
    }

    async fn fetch_with_retry(&self, url: &str, want_json: bool) -> HttpResult<String> {
        let mut attempt = 0;
        loop {
            let result = {
                let _permit = self
                    .limiter
                    .acquire()
                    .await
                    .map_err(|_| HttpError::LimiterClosed {
                        url: url.to_string(),
                    })?;

                match tokio::time::timeout(self.policy.timeout, self.attempt(url, want_json)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(HttpError::Timeout {
                        url: url.to_string(),
                        timeout_ms: self.policy.timeout.as_millis() as u64,
                    }),
                }
            };

            match result {
                Ok(body) => return Ok(body),
                Err(err) if attempt < self.policy.retries && err.is_retriable(&self.policy) => {
                    let delay = self.policy.backoff(attempt);
                    tracing::debug!(
                        "Attempt {} for {} failed ({}), retrying in {:?}",
                        attempt + 1,
                        url,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if attempt > 0 {
                        tracing::warn!("Giving up on {} after {} attempts: {}", url, attempt + 1, err);
                    }
                    return Err(err);
                }
            }
        }
    }

    /// One request: send, check status, read the body
    async fn attempt(&self, url: &str, want_json: bool) -> HttpResult<String> {
        let mut request = self.client.get(url);
        if want_json {
            request = request.header(ACCEPT, HeaderValue::from_static("application/json"));
        }

        let response = request.send().await.map_err(|source| HttpError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        response.text().await.map_err(|source| HttpError::Transport {
            url: url.to_string(),
            source,
        })
    }
}
