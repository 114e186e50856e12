//! # Request Façade
//!
//! `ApiClient` is the single entry point callers use. It holds the transport
//! chosen at startup and never re-evaluates it.
//!
//! ```rust,ignore
//! let config = AppConfig::load_or_default(None);
//! let api = TransportSelector::new(&config.transport).connect(&config.storage).await?;
//!
//! let response = api.request(Method::GET, "/api/inventory", None).await?;
//! ```
//!
//! The typed helpers (`list_items`, `create_item`, ...) build the same
//! requests and fail on any non-2xx answer, in both modes.

use std::sync::Arc;

use http::Method;
use serde::Serialize;
use serde_json::{json, Value};

use whatstock_core::{InventoryItem, InventoryItemPatch, NewInventoryItem, API_ROOT};

use crate::config::TransportSettings;
use crate::error::{TransportError, TransportResult};
use crate::response::ApiResponse;
use crate::transport::{Transport, TransportKind};

/// The request façade.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    api_root: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("transport", &self.transport.kind())
            .field("api_root", &self.api_root)
            .finish()
    }
}

impl ApiClient {
    /// Creates a façade over an injected transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        ApiClient {
            transport,
            api_root: API_ROOT.to_string(),
        }
    }

    /// Creates a façade whose typed helpers use `settings.api_root`.
    pub fn from_settings(transport: Arc<dyn Transport>, settings: &TransportSettings) -> Self {
        Self::new(transport).with_api_root(settings.api_root.clone())
    }

    /// Overrides the API root used by the typed helpers.
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into().trim_end_matches('/').to_string();
        self
    }

    /// Which transport answers requests.
    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Sends one request.
    ///
    /// Hosted: always `Ok`, including 404s. Served: non-2xx is
    /// `Err(TransportError::Http)`.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        data: Option<Value>,
    ) -> TransportResult<ApiResponse> {
        self.transport.send(method, url, data).await
    }

    /// Sends one request and fails on any non-2xx answer, in both modes.
    pub async fn request_ok(
        &self,
        method: Method,
        url: &str,
        data: Option<Value>,
    ) -> TransportResult<ApiResponse> {
        self.request(method, url, data).await?.error_for_status()
    }

    // =========================================================================
    // Typed Helpers
    // =========================================================================

    /// `GET /inventory`
    pub async fn list_items(&self) -> TransportResult<Vec<InventoryItem>> {
        self.request_ok(Method::GET, &self.collection_url(), None)
            .await?
            .json()
    }

    /// `GET /inventory/{id}`; `None` on 404.
    pub async fn get_item(&self, id: &str) -> TransportResult<Option<InventoryItem>> {
        not_found_as_none(self.request_ok(Method::GET, &self.item_url(id), None).await)
    }

    /// `POST /inventory`
    pub async fn create_item(&self, input: &NewInventoryItem) -> TransportResult<InventoryItem> {
        self.request_ok(Method::POST, &self.collection_url(), Some(to_body(input)?))
            .await?
            .json()
    }

    /// `PATCH /inventory/{id}`; `None` on 404.
    pub async fn update_item(
        &self,
        id: &str,
        patch: &InventoryItemPatch,
    ) -> TransportResult<Option<InventoryItem>> {
        not_found_as_none(
            self.request_ok(Method::PATCH, &self.item_url(id), Some(to_body(patch)?))
                .await,
        )
    }

    /// `DELETE /inventory/{id}`; `false` on 404.
    pub async fn delete_item(&self, id: &str) -> TransportResult<bool> {
        match self.request_ok(Method::DELETE, &self.item_url(id), None).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// `POST /inventory/{id}/sold`; `None` on 404.
    pub async fn mark_sold(
        &self,
        id: &str,
        buyer_name: &str,
        buyer_email: &str,
    ) -> TransportResult<Option<InventoryItem>> {
        let body = json!({ "buyerName": buyer_name, "buyerEmail": buyer_email });
        let url = format!("{}/sold", self.item_url(id));
        not_found_as_none(self.request_ok(Method::POST, &url, Some(body)).await)
    }

    /// `POST /inventory/{id}/unsold`; `None` on 404.
    pub async fn unmark_sold(&self, id: &str) -> TransportResult<Option<InventoryItem>> {
        let url = format!("{}/unsold", self.item_url(id));
        not_found_as_none(self.request_ok(Method::POST, &url, None).await)
    }

    fn collection_url(&self) -> String {
        format!("{}/inventory", self.api_root)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/inventory/{}", self.api_root, id)
    }
}

fn to_body(value: &impl Serialize) -> TransportResult<Value> {
    serde_json::to_value(value).map_err(|e| TransportError::SerializationFailed(e.to_string()))
}

fn not_found_as_none(
    result: TransportResult<ApiResponse>,
) -> TransportResult<Option<InventoryItem>> {
    match result {
        Ok(response) => response.json().map(Some),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LocalTransport;
    use http::StatusCode;
    use whatstock_core::ItemStatus;
    use whatstock_db::{Database, DbConfig};

    async fn hosted_client() -> ApiClient {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        ApiClient::new(Arc::new(LocalTransport::new(db.inventory())))
    }

    #[tokio::test]
    async fn test_raw_request_keeps_404_as_response() {
        let api = hosted_client().await;
        assert_eq!(api.kind(), TransportKind::Hosted);

        let response = api
            .request(Method::GET, "/api/inventory/missing", None)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let err = api
            .request_ok(Method::GET, "/api/inventory/missing", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), r#"404: {"error":"Not found"}"#);
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let api = hosted_client().await;
        let mut input = NewInventoryItem::new("Vase", "home", "excellent", "3", "9.99");
        input.tags = Some(vec!["glass".to_string(), "blue".to_string()]);

        let created = api.create_item(&input).await.unwrap();
        assert_eq!(created.tags.as_deref(), Some(&["glass".to_string(), "blue".to_string()][..]));
        assert_eq!(api.list_items().await.unwrap(), vec![created.clone()]);
        assert_eq!(api.get_item(&created.id).await.unwrap(), Some(created.clone()));

        let patch = InventoryItemPatch {
            quantity: Some(3),
            ..Default::default()
        };
        let updated = api.update_item(&created.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.quantity, 3);

        let sold = api.mark_sold(&created.id, "Ann", "ann@x.com").await.unwrap().unwrap();
        assert_eq!(sold.status, ItemStatus::Sold);
        let back = api.unmark_sold(&created.id).await.unwrap().unwrap();
        assert!(back.buyer_email.is_none());

        assert!(api.delete_item(&created.id).await.unwrap());
        assert!(!api.delete_item(&created.id).await.unwrap());
        assert_eq!(api.get_item(&created.id).await.unwrap(), None);
        assert_eq!(api.update_item(&created.id, &patch).await.unwrap(), None);
        assert_eq!(api.unmark_sold(&created.id).await.unwrap(), None);
    }
}
