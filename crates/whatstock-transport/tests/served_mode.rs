//! Served mode end to end: a real `InventoryServer` on an ephemeral port,
//! driven through `HttpTransport`, compared against the hosted transport.

use std::sync::Arc;
use std::time::Duration;

use http::{Method, StatusCode};
use serde_json::{json, Value};

use whatstock_core::{InventoryItem, ItemStatus, NewInventoryItem};
use whatstock_db::{Database, DbConfig};
use whatstock_transport::{
    ApiClient, HttpTransport, InventoryServer, LocalRouter, LocalTransport, QueryClient,
    ServerHandle, ServerSettings, TransportError, TransportKind, TransportMode, TransportSelector,
    TransportSettings, UnauthorizedBehavior,
};

async fn start_server() -> ServerHandle {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let settings = ServerSettings {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
    };
    InventoryServer::new(settings, LocalRouter::new(db.inventory()))
        .start()
        .await
        .unwrap()
}

fn served_client(handle: &ServerHandle) -> ApiClient {
    let transport = HttpTransport::new(handle.base_url(), Duration::from_secs(5)).unwrap();
    ApiClient::new(Arc::new(transport))
}

async fn hosted_client() -> ApiClient {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    ApiClient::new(Arc::new(LocalTransport::new(db.inventory())))
}

#[tokio::test]
async fn test_served_lifecycle() {
    let handle = start_server().await;
    let api = served_client(&handle);
    assert_eq!(api.kind(), TransportKind::Served);

    let created = api
        .create_item(&NewInventoryItem::new("Switch", "consoles", "good", 150.0, "220"))
        .await
        .unwrap();
    assert_eq!(created.purchase_price.as_str(), "150");
    assert_eq!(created.quantity, 1);

    assert_eq!(api.list_items().await.unwrap(), vec![created.clone()]);
    assert_eq!(api.get_item(&created.id).await.unwrap(), Some(created.clone()));

    let sold = api
        .mark_sold(&created.id, "Dana", "dana@x.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sold.status, ItemStatus::Sold);
    assert_eq!(sold.created_at, created.created_at);

    let restocked = api.unmark_sold(&created.id).await.unwrap().unwrap();
    assert!(restocked.sold_date.is_none());

    assert!(api.delete_item(&created.id).await.unwrap());
    assert_eq!(api.get_item(&created.id).await.unwrap(), None);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_served_non_2xx_is_an_error_with_status_and_body() {
    let handle = start_server().await;
    let api = served_client(&handle);

    let err = api
        .request(Method::GET, "/api/inventory/unknown-id", None)
        .await
        .unwrap_err();

    match &err {
        TransportError::Http { status, body } => {
            assert_eq!(*status, 404);
            assert_eq!(body, r#"{"error":"Not found"}"#);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.to_string(), r#"404: {"error":"Not found"}"#);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_both_transports_answer_identically() {
    let handle = start_server().await;
    let served = served_client(&handle);
    let hosted = hosted_client().await;

    let body = json!({
        "title": "Poster",
        "category": "art",
        "condition": "fair",
        "purchasePrice": "2",
        "sellingPrice": 8.5,
        "tags": ["print", "print"]
    });

    let served_item: Value = served
        .request_ok(Method::POST, "/api/inventory", Some(body.clone()))
        .await
        .unwrap()
        .into_body();
    let hosted_item: Value = hosted
        .request_ok(Method::POST, "/api/inventory", Some(body))
        .await
        .unwrap()
        .into_body();

    let strip = |mut value: Value| {
        let object = value.as_object_mut().unwrap();
        object.remove("id");
        object.remove("createdAt");
        value
    };
    assert_eq!(strip(served_item), strip(hosted_item));

    for (method, path) in [
        (Method::GET, "/api/inventory/nope"),
        (Method::DELETE, "/api/inventory/nope"),
        (Method::POST, "/api/inventory/nope/unsold"),
        (Method::GET, "/api/nothing-here"),
    ] {
        let served_err = served
            .request_ok(method.clone(), path, None)
            .await
            .unwrap_err();
        let hosted_err = hosted.request_ok(method, path, None).await.unwrap_err();
        assert_eq!(served_err.to_string(), hosted_err.to_string(), "{}", path);
    }

    let hosted_404 = hosted
        .request(Method::GET, "/api/inventory/nope", None)
        .await
        .unwrap();
    assert_eq!(hosted_404.status(), StatusCode::NOT_FOUND);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_query_cache_over_http() {
    let handle = start_server().await;
    let queries = QueryClient::new(served_client(&handle));

    let missing: Option<InventoryItem> = queries
        .query(&["/api/inventory", "nope"], UnauthorizedBehavior::ReturnNull)
        .await
        .unwrap();
    assert!(missing.is_none());

    let created = queries
        .mutate(
            Method::POST,
            "/api/inventory",
            Some(json!({
                "title": "Kettle",
                "category": "kitchen",
                "condition": "good",
                "purchasePrice": 3,
                "sellingPrice": 10
            })),
        )
        .await
        .unwrap()
        .json::<InventoryItem>()
        .unwrap();

    let listed: Vec<InventoryItem> = queries
        .query(&["/api/inventory"], UnauthorizedBehavior::Throw)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(listed, vec![created]);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_served_client_follows_configured_api_root() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let server_settings = ServerSettings {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
    };
    let handle = InventoryServer::new(server_settings, LocalRouter::new(db.inventory()).with_api_root("/v2"))
        .start()
        .await
        .unwrap();

    let settings = TransportSettings {
        mode: TransportMode::Served,
        base_url: handle.base_url(),
        api_root: "/v2".to_string(),
        ..Default::default()
    };
    let api = TransportSelector::new(&settings)
        .connect_with_store(db.inventory())
        .unwrap();
    assert_eq!(api.kind(), TransportKind::Served);

    let created = api
        .create_item(&NewInventoryItem::new("Radio", "electronics", "fair", "4", "15"))
        .await
        .unwrap();
    assert_eq!(api.list_items().await.unwrap(), vec![created]);

    handle.shutdown().await.unwrap();
}
