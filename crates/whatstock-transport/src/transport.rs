//! # Transports
//!
//! The two ways a façade request can be answered, and the selector that
//! picks one of them once at startup.
//!
//! ## Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Transport Selection (once)                         │
//! │                                                                         │
//! │  TransportSettings.mode                                                │
//! │       │                                                                 │
//! │       ├── hosted ─────────────────────────────┐                         │
//! │       ├── served ──────────────────────┐      │                         │
//! │       └── auto ──► EnvironmentProbe    │      │                         │
//! │                    │ in shell? ─ yes ──┼──────┤                         │
//! │                    └─────────── no ────┤      │                         │
//! │                                        ▼      ▼                         │
//! │                              HttpTransport  LocalTransport              │
//! │                              (reqwest)      (LocalRouter → store)       │
//! │                                        │      │                         │
//! │                                        └──┬───┘                         │
//! │                                           ▼                             │
//! │                                  Arc<dyn Transport>                     │
//! │                                  injected into ApiClient                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Behavior
//! - Hosted: always resolves. A 404 is an `ApiResponse` with status 404.
//! - Served: any non-2xx is `TransportError::Http { status, body }`. No retry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use whatstock_db::{Database, DbConfig, InventoryStore};

use crate::client::ApiClient;
use crate::config::{StorageSettings, TransportMode, TransportSettings};
use crate::error::{TransportError, TransportResult};
use crate::response::ApiResponse;
use crate::router::LocalRouter;

/// Environment variable the desktop shell sets for its embedded client.
pub const SHELL_ENV_VAR: &str = "WHATSTOCK_SHELL";

// =============================================================================
// Transport Trait
// =============================================================================

/// The resolved transport kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// In-process local store.
    Hosted,
    /// HTTP to a server.
    Served,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Hosted => write!(f, "hosted"),
            TransportKind::Served => write!(f, "served"),
        }
    }
}

/// Sends one request and returns its answer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which kind of transport this is.
    fn kind(&self) -> TransportKind;

    /// Sends `method url` with an optional JSON body.
    async fn send(&self, method: Method, url: &str, body: Option<Value>)
        -> TransportResult<ApiResponse>;
}

// =============================================================================
// Hosted
// =============================================================================

/// Answers requests through a [`LocalRouter`]. Performs no network I/O.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    router: LocalRouter,
}

impl LocalTransport {
    /// Creates a transport over `store` with the default API root.
    pub fn new(store: InventoryStore) -> Self {
        LocalTransport {
            router: LocalRouter::new(store),
        }
    }

    /// Creates a transport over an already configured router.
    pub fn with_router(router: LocalRouter) -> Self {
        LocalTransport { router }
    }

    /// Returns the router.
    pub fn router(&self) -> &LocalRouter {
        &self.router
    }
}

#[async_trait]
impl Transport for LocalTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Hosted
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> TransportResult<ApiResponse> {
        Ok(self.router.route(&method, url, body).await.into())
    }
}

// =============================================================================
// Served
// =============================================================================

/// Answers requests over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TransportResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(HttpTransport {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Served
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> TransportResult<ApiResponse> {
        let target = format!("{}{}", self.base_url, url);
        debug!(method = %method, url = %target, "Sending HTTP request");

        let mut request = self.http.request(method, &target);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status: StatusCode = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = if text.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                text
            };
            debug!(status = status.as_u16(), "HTTP request failed");
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse::new(status, body))
    }
}

// =============================================================================
// Environment Probe
// =============================================================================

/// Answers "are we running inside the desktop shell?".
pub trait EnvironmentProbe: Send + Sync {
    fn is_hosted(&self) -> bool;
}

/// Reads the shell marker from an environment variable.
///
/// Set and not `0`/`false`/empty means hosted.
#[derive(Debug, Clone)]
pub struct ShellEnvProbe {
    var: String,
}

impl ShellEnvProbe {
    /// Probes a custom variable.
    pub fn with_var(var: impl Into<String>) -> Self {
        ShellEnvProbe { var: var.into() }
    }
}

impl Default for ShellEnvProbe {
    fn default() -> Self {
        Self::with_var(SHELL_ENV_VAR)
    }
}

impl EnvironmentProbe for ShellEnvProbe {
    fn is_hosted(&self) -> bool {
        match std::env::var(&self.var) {
            Ok(value) => {
                let value = value.trim().to_lowercase();
                !(value.is_empty() || value == "0" || value == "false")
            }
            Err(_) => false,
        }
    }
}

/// A probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub bool);

impl EnvironmentProbe for FixedProbe {
    fn is_hosted(&self) -> bool {
        self.0
    }
}

// =============================================================================
// Selector
// =============================================================================

/// Resolves the transport kind once and builds the matching transport.
#[derive(Debug, Clone)]
pub struct TransportSelector {
    kind: TransportKind,
    settings: TransportSettings,
}

impl TransportSelector {
    /// Resolves with the default [`ShellEnvProbe`].
    pub fn new(settings: &TransportSettings) -> Self {
        Self::with_probe(settings, &ShellEnvProbe::default())
    }

    /// Resolves with `probe`. The probe is consulted at most once, and only in
    /// auto mode.
    pub fn with_probe(settings: &TransportSettings, probe: &dyn EnvironmentProbe) -> Self {
        let kind = match settings.mode {
            TransportMode::Hosted => TransportKind::Hosted,
            TransportMode::Served => TransportKind::Served,
            TransportMode::Auto => {
                if probe.is_hosted() {
                    TransportKind::Hosted
                } else {
                    TransportKind::Served
                }
            }
        };

        info!(mode = %settings.mode, kind = %kind, "Transport selected");

        TransportSelector {
            kind,
            settings: settings.clone(),
        }
    }

    /// The resolved kind.
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Builds the transport, opening the local database when hosted.
    pub async fn open(&self, storage: &StorageSettings) -> TransportResult<Arc<dyn Transport>> {
        match self.kind {
            TransportKind::Hosted => {
                let path = storage.resolve_database_path();
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| TransportError::DatabaseError(e.to_string()))?;
                }
                let db = Database::new(DbConfig::new(path)).await?;
                Ok(self.hosted(db.inventory()))
            }
            TransportKind::Served => self.served(),
        }
    }

    /// Builds the transport over an existing store when hosted.
    pub fn with_store(&self, store: InventoryStore) -> TransportResult<Arc<dyn Transport>> {
        match self.kind {
            TransportKind::Hosted => Ok(self.hosted(store)),
            TransportKind::Served => self.served(),
        }
    }

    /// Opens the transport and wraps it in a façade on the configured API root.
    pub async fn connect(&self, storage: &StorageSettings) -> TransportResult<ApiClient> {
        let transport = self.open(storage).await?;
        Ok(ApiClient::from_settings(transport, &self.settings))
    }

    /// [`connect`](Self::connect) over an existing store.
    pub fn connect_with_store(&self, store: InventoryStore) -> TransportResult<ApiClient> {
        let transport = self.with_store(store)?;
        Ok(ApiClient::from_settings(transport, &self.settings))
    }

    fn hosted(&self, store: InventoryStore) -> Arc<dyn Transport> {
        let router = LocalRouter::new(store).with_api_root(self.settings.api_root.clone());
        Arc::new(LocalTransport::with_router(router))
    }

    fn served(&self) -> TransportResult<Arc<dyn Transport>> {
        let transport = HttpTransport::new(
            self.settings.base_url.clone(),
            self.settings.request_timeout(),
        )?;
        Ok(Arc::new(transport))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;
    use whatstock_db::{Database, DbConfig};

    struct CountingProbe {
        calls: AtomicUsize,
        answer: bool,
    }

    impl EnvironmentProbe for CountingProbe {
        fn is_hosted(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    fn settings(mode: TransportMode) -> TransportSettings {
        TransportSettings {
            mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_auto_mode_probes_exactly_once() {
        let probe = CountingProbe {
            calls: AtomicUsize::new(0),
            answer: true,
        };
        let selector = TransportSelector::with_probe(&settings(TransportMode::Auto), &probe);

        assert_eq!(selector.kind(), TransportKind::Hosted);
        assert_eq!(selector.kind(), TransportKind::Hosted);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_forced_modes_ignore_probe() {
        let probe = CountingProbe {
            calls: AtomicUsize::new(0),
            answer: true,
        };

        let served = TransportSelector::with_probe(&settings(TransportMode::Served), &probe);
        assert_eq!(served.kind(), TransportKind::Served);

        let hosted = TransportSelector::with_probe(&settings(TransportMode::Hosted), &FixedProbe(false));
        assert_eq!(hosted.kind(), TransportKind::Hosted);

        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_auto_outside_shell_is_served() {
        let selector = TransportSelector::with_probe(&settings(TransportMode::Auto), &FixedProbe(false));
        assert_eq!(selector.kind(), TransportKind::Served);
    }

    #[test]
    fn test_shell_env_probe() {
        let var = "WHATSTOCK_SHELL_PROBE_TEST";
        let probe = ShellEnvProbe::with_var(var);

        std::env::remove_var(var);
        assert!(!probe.is_hosted());

        std::env::set_var(var, "false");
        assert!(!probe.is_hosted());

        std::env::set_var(var, "1");
        assert!(probe.is_hosted());

        std::env::remove_var(var);
    }

    #[tokio::test]
    async fn test_hosted_404_resolves() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let transport = LocalTransport::new(db.inventory());

        let response = transport
            .send(Method::GET, "/api/inventory/missing", None)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.error_for_status().unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_hosted_mode_performs_no_network_io() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let settings = TransportSettings {
            mode: TransportMode::Hosted,
            base_url: format!("http://{}", addr),
            ..Default::default()
        };
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let transport = TransportSelector::with_probe(&settings, &FixedProbe(false))
            .with_store(db.inventory())
            .unwrap();
        assert_eq!(transport.kind(), TransportKind::Hosted);

        for _ in 0..5 {
            transport.send(Method::GET, "/api/inventory", None).await.unwrap();
            transport.send(Method::GET, "/api/inventory/x", None).await.unwrap();
        }

        let accepted =
            tokio::time::timeout(Duration::from_millis(200), listener.accept()).await;
        assert!(accepted.is_err(), "hosted transport opened a connection");
    }

    #[tokio::test]
    async fn test_connect_uses_configured_api_root() {
        let settings = TransportSettings {
            mode: TransportMode::Hosted,
            api_root: "/v2".to_string(),
            ..Default::default()
        };
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let api = TransportSelector::with_probe(&settings, &FixedProbe(false))
            .connect_with_store(db.inventory())
            .unwrap();

        assert!(api.list_items().await.unwrap().is_empty());
        let created = api
            .create_item(&whatstock_core::NewInventoryItem::new("Lamp", "home", "good", "1", "2"))
            .await
            .unwrap();
        assert_eq!(api.get_item(&created.id).await.unwrap(), Some(created));

        let old_root = api.request(Method::GET, "/api/inventory", None).await.unwrap();
        assert_eq!(old_root.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_served_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(format!("http://{}/", addr), Duration::from_secs(2)).unwrap();
        assert_eq!(transport.base_url(), format!("http://{}", addr));

        let err = transport
            .send(Method::GET, "/api/inventory", None)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ConnectionFailed(_)));
    }
}
