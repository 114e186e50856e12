//! # Local Request Router
//!
//! Answers façade requests in-process by calling the item store. The HTTP
//! server mounts this same router, so both transports give identical status
//! codes and bodies.
//!
//! ## Route Table
//! ```text
//! ┌──────────┬──────────────────────────┬─────────────────┬────────────────┐
//! │ Method   │ Path (after /api)        │ Store call      │ Absent →       │
//! ├──────────┼──────────────────────────┼─────────────────┼────────────────┤
//! │ GET      │ /inventory               │ get_all         │                │
//! │ POST     │ /inventory               │ create          │                │
//! │ GET      │ /inventory/{id}          │ get_one         │ 404            │
//! │ PATCH    │ /inventory/{id}          │ update          │ 404            │
//! │ PUT      │ /inventory/{id}          │ update          │ 404            │
//! │ DELETE   │ /inventory/{id}          │ delete          │ 404            │
//! │ POST     │ /inventory/{id}/sold     │ mark_sold       │ 404            │
//! │ POST     │ /inventory/{id}/unsold   │ unmark_sold     │ 404            │
//! │ *        │ anything else            │                 │ 404            │
//! └──────────┴──────────────────────────┴─────────────────┴────────────────┘
//! ```
//!
//! Segments match exactly; an id never contains `/`.
//!
//! ## Status Codes
//! - 200 with the item (or `{"success": true}` for DELETE)
//! - 400 `{"error": "<reason>"}` when the body can't be read as the input type
//! - 404 `{"error": "Not found"}`
//! - 500 `{"error": "Internal error"}` on storage failure (details go to the log)

use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error};

use whatstock_core::{BuyerDetails, InventoryItem, InventoryItemPatch, NewInventoryItem, API_ROOT};
use whatstock_db::{DbResult, InventoryStore};

// =============================================================================
// Route Response
// =============================================================================

/// Status and JSON body produced by the router.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl RouteResponse {
    /// 200 with `value` as the body.
    pub fn ok(value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => RouteResponse {
                status: StatusCode::OK,
                body,
            },
            Err(e) => {
                error!(error = %e, "Failed to serialize response body");
                Self::internal_error()
            }
        }
    }

    /// 404 `{"error": "Not found"}`.
    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, "Not found")
    }

    /// 400 with the coercion failure as the message.
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::error(StatusCode::BAD_REQUEST, reason)
    }

    /// 500 `{"error": "Internal error"}`.
    pub fn internal_error() -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    }

    fn error(status: StatusCode, message: impl Into<String>) -> Self {
        RouteResponse {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    fn found(item: Option<InventoryItem>) -> Self {
        match item {
            Some(item) => Self::ok(item),
            None => Self::not_found(),
        }
    }
}

// =============================================================================
// Local Router
// =============================================================================

/// In-process request router over an [`InventoryStore`].
#[derive(Debug, Clone)]
pub struct LocalRouter {
    store: InventoryStore,
    api_root: String,
}

impl LocalRouter {
    /// Creates a router with the default `/api` root.
    pub fn new(store: InventoryStore) -> Self {
        LocalRouter {
            store,
            api_root: API_ROOT.to_string(),
        }
    }

    /// Overrides the API root stripped before matching.
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the API root.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Returns the backing store.
    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    /// Strips the API root from `path` when it is a whole leading segment.
    pub fn strip_api_root<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.api_root.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    /// Routes one request. Never fails: every outcome is a status and body.
    pub async fn route(&self, method: &Method, path: &str, body: Option<Value>) -> RouteResponse {
        let path = path.split('?').next().unwrap_or_default();
        let path = self.strip_api_root(path).unwrap_or(path);

        debug!(method = %method, path = %path, "Routing local request");

        match self.dispatch(method, path, body).await {
            Ok(response) => response,
            Err(e) => {
                error!(method = %method, path = %path, error = %e, "Store operation failed");
                RouteResponse::internal_error()
            }
        }
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<Value>,
    ) -> DbResult<RouteResponse> {
        let segments: Vec<&str> = match path.strip_prefix('/') {
            Some(rest) => rest.split('/').collect(),
            None => return Ok(RouteResponse::not_found()),
        };

        let response = match (method, segments.as_slice()) {
            (&Method::GET, ["inventory"]) => RouteResponse::ok(self.store.get_all().await?),

            (&Method::POST, ["inventory"]) => match coerce::<NewInventoryItem>(body) {
                Ok(input) => RouteResponse::ok(self.store.create(input).await?),
                Err(response) => response,
            },

            (&Method::GET, ["inventory", id]) if is_id(id) => {
                RouteResponse::found(self.store.get_one(id).await?)
            }

            (&Method::PATCH | &Method::PUT, ["inventory", id]) if is_id(id) => {
                match coerce::<InventoryItemPatch>(body) {
                    Ok(patch) => RouteResponse::found(self.store.update(id, patch).await?),
                    Err(response) => response,
                }
            }

            (&Method::DELETE, ["inventory", id]) if is_id(id) => {
                if self.store.delete(id).await? {
                    RouteResponse::ok(json!({ "success": true }))
                } else {
                    RouteResponse::not_found()
                }
            }

            (&Method::POST, ["inventory", id, "sold"]) if is_id(id) => {
                match coerce::<BuyerDetails>(body) {
                    Ok(buyer) => RouteResponse::found(
                        self.store
                            .mark_sold(id, &buyer.buyer_name, &buyer.buyer_email)
                            .await?,
                    ),
                    Err(response) => response,
                }
            }

            (&Method::POST, ["inventory", id, "unsold"]) if is_id(id) => {
                RouteResponse::found(self.store.unmark_sold(id).await?)
            }

            _ => RouteResponse::not_found(),
        };

        Ok(response)
    }
}

fn is_id(segment: &str) -> bool {
    !segment.is_empty()
}

/// Reads a request body as `T`. A missing or null body reads as `{}`.
fn coerce<T: DeserializeOwned>(body: Option<Value>) -> Result<T, RouteResponse> {
    let value = match body {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(value) => value,
    };

    serde_json::from_value(value).map_err(|e| RouteResponse::bad_request(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use whatstock_db::{Database, DbConfig};

    async fn router() -> LocalRouter {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        LocalRouter::new(db.inventory())
    }

    fn lamp() -> Value {
        json!({
            "title": "Lamp",
            "category": "home",
            "condition": "good",
            "purchasePrice": 5,
            "sellingPrice": "12.00"
        })
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_404() {
        let router = router().await;
        let response = router.route(&Method::GET, "/api/inventory/unknown-id", None).await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, json!({ "error": "Not found" }));
    }

    #[tokio::test]
    async fn test_post_applies_defaults_and_lists() {
        let router = router().await;
        let created = router.route(&Method::POST, "/api/inventory", Some(lamp())).await;

        assert_eq!(created.status, StatusCode::OK);
        let body = &created.body;
        assert!(!body["id"].as_str().unwrap().is_empty());
        assert_eq!(body["quantity"], json!(1));
        assert_eq!(body["status"], json!("in_stock"));
        assert_eq!(body["isGiveaway"], json!(0));
        assert_eq!(body["purchasePrice"], json!("5"));
        assert_eq!(body["sellingPrice"], json!("12.00"));
        assert!(body["createdAt"].is_string());
        for field in ["subCategory", "weight", "description", "imageUrl", "tags", "buyerName", "buyerEmail", "soldDate"] {
            assert_eq!(body[field], Value::Null, "field {}", field);
        }

        let listed = router.route(&Method::GET, "/api/inventory", None).await;
        assert_eq!(listed.status, StatusCode::OK);
        assert_eq!(listed.body, json!([created.body]));
    }

    #[tokio::test]
    async fn test_prefix_is_optional() {
        let router = router().await;
        let with_prefix = router.route(&Method::GET, "/api/inventory", None).await;
        let without = router.route(&Method::GET, "/inventory", None).await;

        assert_eq!(with_prefix, without);
        assert_eq!(without.body, json!([]));
    }

    #[tokio::test]
    async fn test_full_item_lifecycle() {
        let router = router().await;
        let created = router.route(&Method::POST, "/api/inventory", Some(lamp())).await;
        let id = created.body["id"].as_str().unwrap().to_string();
        let item_path = format!("/api/inventory/{}", id);

        let fetched = router.route(&Method::GET, &item_path, None).await;
        assert_eq!(fetched.body, created.body);

        let patched = router
            .route(&Method::PATCH, &item_path, Some(json!({ "title": "Desk Lamp", "description": null })))
            .await;
        assert_eq!(patched.status, StatusCode::OK);
        assert_eq!(patched.body["title"], json!("Desk Lamp"));
        assert_eq!(patched.body["createdAt"], created.body["createdAt"]);

        let put = router
            .route(&Method::PUT, &item_path, Some(json!({ "quantity": 2 })))
            .await;
        assert_eq!(put.body["quantity"], json!(2));

        let sold = router
            .route(
                &Method::POST,
                &format!("{}/sold", item_path),
                Some(json!({ "buyerName": "Alice", "buyerEmail": "a@x.com" })),
            )
            .await;
        assert_eq!(sold.body["status"], json!("sold"));
        assert_eq!(sold.body["buyerName"], json!("Alice"));
        assert!(sold.body["soldDate"].is_string());

        let unsold = router
            .route(&Method::POST, &format!("{}/unsold", item_path), None)
            .await;
        assert_eq!(unsold.body["status"], json!("in_stock"));
        assert_eq!(unsold.body["buyerName"], Value::Null);
        assert_eq!(unsold.body["soldDate"], Value::Null);

        let deleted = router.route(&Method::DELETE, &item_path, None).await;
        assert_eq!(deleted.status, StatusCode::OK);
        assert_eq!(deleted.body, json!({ "success": true }));

        let again = router.route(&Method::DELETE, &item_path, None).await;
        assert_eq!(again.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_targets_are_404() {
        let router = router().await;
        let buyer = json!({ "buyerName": "B", "buyerEmail": "b@x.com" });

        let cases = [
            (Method::PATCH, "/api/inventory/nope", Some(json!({ "title": "x" }))),
            (Method::PUT, "/api/inventory/nope", Some(json!({}))),
            (Method::POST, "/api/inventory/nope/sold", Some(buyer)),
            (Method::POST, "/api/inventory/nope/unsold", None),
        ];
        for (method, path, body) in cases {
            let response = router.route(&method, path, body).await;
            assert_eq!(response.status, StatusCode::NOT_FOUND, "{} {}", method, path);
        }
    }

    #[tokio::test]
    async fn test_unmatched_routes_are_404() {
        let router = router().await;
        let cases = [
            (Method::DELETE, "/api/inventory"),
            (Method::GET, "/api/inventory/"),
            (Method::GET, "/api/inventory/a/b"),
            (Method::GET, "/api/inventory/a/sold"),
            (Method::GET, "/api/items"),
            (Method::POST, "/api/inventory//sold"),
            (Method::GET, "/apiary/inventory"),
            (Method::GET, "inventory"),
        ];
        for (method, path) in cases {
            let response = router.route(&method, path, None).await;
            assert_eq!(response.status, StatusCode::NOT_FOUND, "{} {}", method, path);
            assert_eq!(response.body, json!({ "error": "Not found" }));
        }
    }

    #[tokio::test]
    async fn test_uncoercible_bodies_are_400() {
        let router = router().await;

        let missing_title = router
            .route(&Method::POST, "/api/inventory", Some(json!({ "category": "x" })))
            .await;
        assert_eq!(missing_title.status, StatusCode::BAD_REQUEST);
        assert!(missing_title.body["error"].as_str().unwrap().contains("title"));

        let created = router.route(&Method::POST, "/api/inventory", Some(lamp())).await;
        let id = created.body["id"].as_str().unwrap();

        let bad_status = router
            .route(
                &Method::PATCH,
                &format!("/api/inventory/{}", id),
                Some(json!({ "status": "lost" })),
            )
            .await;
        assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);

        let no_buyer = router
            .route(&Method::POST, &format!("/api/inventory/{}/sold", id), None)
            .await;
        assert_eq!(no_buyer.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_string_is_ignored() {
        let router = router().await;
        let response = router.route(&Method::GET, "/api/inventory?fresh=1", None).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_custom_api_root() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let router = LocalRouter::new(db.inventory()).with_api_root("/v2/");

        assert_eq!(router.api_root(), "/v2");
        let response = router.route(&Method::GET, "/v2/inventory", None).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let router = LocalRouter::new(db.inventory());
        db.close().await;

        let response = router.route(&Method::GET, "/api/inventory", None).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body, json!({ "error": "Internal error" }));
    }
}
