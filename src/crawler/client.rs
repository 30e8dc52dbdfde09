//! Remote item client
//!
//! Thin layer over the transport that knows the item API's endpoints and
//! turns every malformed payload into "absent".

use crate::crawler::transport::HttpClient;
use crate::item::RemoteNode;
use crate::HttpResult;
use async_trait::async_trait;
use serde_json::Value;

/// Where items come from
///
/// The collector and driver only talk to this trait, so tests can serve
/// items from memory.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Fetches one item
    ///
    /// `Ok(None)` means the item does not exist or failed validation.
    /// `Err` is reserved for transport failures.
    async fn fetch_item(&self, id: u64) -> HttpResult<Option<RemoteNode>>;

    /// The first `limit` ids of the current top stories list
    ///
    /// Failures are logged and yield an empty list.
    async fn top_story_ids(&self, limit: usize) -> Vec<u64>;

    /// Fetches an arbitrary page as text (used for linked articles)
    async fn fetch_page(&self, url: &str) -> HttpResult<String>;
}

/// [`ItemSource`] backed by the Hacker News Firebase API
#[derive(Debug, Clone)]
pub struct HnClient {
    http: HttpClient,
    base_url: String,
}

impl HnClient {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn item_url(&self, id: u64) -> String {
        format!("{}/item/{}.json", self.base_url, id)
    }

    pub fn top_stories_url(&self) -> String {
        format!("{}/topstories.json", self.base_url)
    }
}

#[async_trait]
impl ItemSource for HnClient {
    async fn fetch_item(&self, id: u64) -> HttpResult<Option<RemoteNode>> {
        let value: Value = self.http.fetch_json(&self.item_url(id)).await?;
        if value.is_null() {
            tracing::debug!("Item {} does not exist", id);
            return Ok(None);
        }

        match RemoteNode::validate(value) {
            Ok(node) => Ok(Some(node)),
            Err(e) => {
                tracing::debug!("Item {} failed validation: {}", id, e);
                Ok(None)
            }
        }
    }

    async fn top_story_ids(&self, limit: usize) -> Vec<u64> {
        let url = self.top_stories_url();
        let value: Value = match self.http.fetch_json(&url).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to fetch top stories: {}", e);
                return Vec::new();
            }
        };

        match value {
            Value::Array(ids) => ids.iter().filter_map(Value::as_u64).take(limit).collect(),
            other => {
                tracing::warn!("Top stories payload from {} is not an array: {}", url, other);
                Vec::new()
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> HttpResult<String> {
        self.http.fetch_text(url).await
    }
}
