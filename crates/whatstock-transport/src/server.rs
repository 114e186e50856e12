//! # Inventory HTTP Server
//!
//! The served-mode backend. It mounts the [`LocalRouter`] under the API root
//! for every method, so a browser client talking HTTP gets exactly the
//! answers the desktop shell gets in-process.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    InventoryServer (Axum)                               │
//! │                                                                         │
//! │  GET  /health ──────────────────────────────► "OK"                      │
//! │                                                                         │
//! │  *    /api/... ──► read JSON body ──► LocalRouter::route ──► store      │
//! │                     │                       │                           │
//! │                     └─ unparseable → 400    └─ (status, JSON body)      │
//! │                                                                         │
//! │  *    anything else ────────────────────────► 404 {"error":"Not found"} │
//! │                                                                         │
//! │  Shutdown: ServerHandle::shutdown() → graceful drain → task exits       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ServerSettings;
use crate::error::{TransportError, TransportResult};
use crate::router::{LocalRouter, RouteResponse};

// =============================================================================
// Server
// =============================================================================

/// The served-mode HTTP server.
pub struct InventoryServer {
    settings: ServerSettings,
    router: Arc<LocalRouter>,
}

/// Handle for controlling a running server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL for an [`HttpTransport`](crate::transport::HttpTransport).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(self) -> TransportResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| TransportError::ChannelError("Server shutdown channel closed".into()))?;

        self.task
            .await
            .map_err(|e| TransportError::ChannelError(format!("Server task failed: {}", e)))
    }
}

impl InventoryServer {
    /// Creates a server over `router`.
    pub fn new(settings: ServerSettings, router: LocalRouter) -> Self {
        InventoryServer {
            settings,
            router: Arc::new(router),
        }
    }

    /// Builds the axum application.
    pub fn app(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .fallback(api_handler)
            .with_state(Arc::clone(&self.router))
    }

    /// Binds and starts serving in a background task.
    pub async fn start(self) -> TransportResult<ServerHandle> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let app = self.app();

        let bind_addr = self.settings.bind_address();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| TransportError::BindFailed {
                addr: bind_addr.clone(),
                reason: e.to_string(),
            })?;
        let local_addr = listener.local_addr().map_err(|e| TransportError::BindFailed {
            addr: bind_addr.clone(),
            reason: e.to_string(),
        })?;

        info!(addr = %local_addr, api_root = %self.router.api_root(), "Inventory server started");

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_rx.recv().await;
                    info!("Inventory server shutting down");
                })
                .await
                .ok();
        });

        Ok(ServerHandle {
            local_addr,
            shutdown_tx,
            task,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    "OK"
}

/// Everything that isn't `/health`.
async fn api_handler(
    State(router): State<Arc<LocalRouter>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri.path();

    if router.strip_api_root(path).is_none() {
        debug!(method = %method, path = %path, "Request outside API root");
        return into_response(RouteResponse::not_found());
    }

    let body = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Some(value),
            Err(e) => return into_response(RouteResponse::bad_request(e.to_string())),
        }
    };

    into_response(router.route(&method, path, body).await)
}

fn into_response(response: RouteResponse) -> Response {
    (response.status, Json(response.body)).into_response()
}
