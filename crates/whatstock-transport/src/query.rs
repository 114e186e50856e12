//! # Query Cache
//!
//! A key-path cache over the request façade for read queries.
//!
//! ## Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  query(["/api/inventory", id])                                          │
//! │       │                                                                 │
//! │       ├── cached? ──► return it (never stale, never refetched)          │
//! │       │                                                                 │
//! │       └── GET "/api/inventory/<id>" once (no retry)                     │
//! │              │                                                          │
//! │              ├── ok ────► cache + return                                │
//! │              └── error ─► Throw:      propagate                         │
//! │                           ReturnNull: None (nothing cached)             │
//! │                                                                         │
//! │  Writes go through `mutate` and the caller invalidates what changed.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::time::Duration;

use http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::TransportResult;
use crate::response::ApiResponse;

/// What a query does when its request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnauthorizedBehavior {
    /// Propagate the error.
    #[default]
    Throw,
    /// Resolve to `None` instead.
    ReturnNull,
}

/// The fixed cache policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Failed requests are retried. Always false.
    pub retry: bool,
    /// Queries refetch when the window regains focus. Always false.
    pub refetch_on_focus: bool,
    /// Periodic refetch interval. `None` = never.
    pub refetch_interval: Option<Duration>,
    /// How long a cached value stays fresh. `None` = forever.
    pub stale_time: Option<Duration>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            retry: false,
            refetch_on_focus: false,
            refetch_interval: None,
            stale_time: None,
        }
    }
}

/// Key-path query cache.
#[derive(Debug)]
pub struct QueryClient {
    api: ApiClient,
    cache: RwLock<HashMap<Vec<String>, Value>>,
    options: QueryOptions,
}

impl QueryClient {
    /// Creates a cache over `api` with the default policy.
    pub fn new(api: ApiClient) -> Self {
        QueryClient {
            api,
            cache: RwLock::new(HashMap::new()),
            options: QueryOptions::default(),
        }
    }

    /// Returns the façade.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Returns the cache policy.
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// The request URL for a key path: its parts joined with `/`.
    pub fn url_for(key: &[&str]) -> String {
        key.join("/")
    }

    /// Runs a GET query for `key`, serving from cache when possible.
    pub async fn query<T: DeserializeOwned>(
        &self,
        key: &[&str],
        on_failure: UnauthorizedBehavior,
    ) -> TransportResult<Option<T>> {
        let cache_key = owned_key(key);

        let cached = self.cache.read().await.get(&cache_key).cloned();
        if let Some(value) = cached {
            debug!(key = ?cache_key, "Query cache hit");
            return self.decode(value, on_failure);
        }

        let url = Self::url_for(key);
        let fetched = self
            .api
            .request(Method::GET, &url, None)
            .await
            .and_then(ApiResponse::error_for_status);

        let value = match fetched {
            Ok(response) => response.into_body(),
            Err(e) => {
                debug!(url = %url, error = %e, "Query failed");
                return match on_failure {
                    UnauthorizedBehavior::ReturnNull => Ok(None),
                    UnauthorizedBehavior::Throw => Err(e),
                };
            }
        };

        self.cache.write().await.insert(cache_key, value.clone());
        self.decode(value, on_failure)
    }

    /// Sends a write through the façade, failing on any non-2xx answer.
    /// Never retried.
    pub async fn mutate(
        &self,
        method: Method,
        url: &str,
        data: Option<Value>,
    ) -> TransportResult<ApiResponse> {
        self.api.request_ok(method, url, data).await
    }

    /// Drops every cached entry whose key starts with `prefix`.
    pub async fn invalidate(&self, prefix: &[&str]) {
        let prefix = owned_key(prefix);
        let mut cache = self.cache.write().await;
        cache.retain(|key, _| !key.starts_with(&prefix));
        debug!(prefix = ?prefix, remaining = cache.len(), "Invalidated queries");
    }

    /// Empties the cache.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// True when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    fn decode<T: DeserializeOwned>(
        &self,
        value: Value,
        on_failure: UnauthorizedBehavior,
    ) -> TransportResult<Option<T>> {
        match serde_json::from_value(value) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(_) if on_failure == UnauthorizedBehavior::ReturnNull => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn owned_key(key: &[&str]) -> Vec<String> {
    key.iter().map(|part| part.to_string()).collect()
}
