//! # whatstock-transport: Request Façade for WhatStock
//!
//! One logical inventory API, answered either in-process (hosted, inside the
//! desktop shell) or over HTTP (served, for a browser client). Callers can't
//! tell the difference: routes, status codes, bodies, id generation, default
//! coalescing and date handling are the same either way.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Request Flow                                     │
//! │                                                                         │
//! │  caller ──► QueryClient (cache, optional)                              │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │             ApiClient::request(method, url, data)                      │
//! │                 │                                                       │
//! │                 ▼   Arc<dyn Transport>, chosen once by TransportSelector│
//! │        ┌────────┴──────────────────┐                                   │
//! │        ▼                           ▼                                    │
//! │  LocalTransport               HttpTransport ──HTTP──► InventoryServer  │
//! │        │                                                   │           │
//! │        ▼                                                   ▼           │
//! │  LocalRouter ◄──────────────── same router ───────── LocalRouter       │
//! │        │                                                   │           │
//! │        ▼                                                   ▼           │
//! │  InventoryStore (whatstock-db)                    InventoryStore       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - `AppConfig` (transport mode, base URL, storage, server)
//! - [`error`] - Transport error types
//! - [`router`] - `LocalRouter`, method + path to store operation
//! - [`response`] - `ApiResponse`
//! - [`transport`] - `Transport` trait, hosted/served implementations, selector
//! - [`client`] - `ApiClient`, the request façade
//! - [`query`] - `QueryClient`, key-path query cache
//! - [`server`] - `InventoryServer`, the served-mode backend
//!
//! ## Usage
//!
//! ```rust,ignore
//! use whatstock_transport::{AppConfig, TransportSelector};
//!
//! let config = AppConfig::load_or_default(None);
//! let api = TransportSelector::new(&config.transport)
//!     .connect(&config.storage)
//!     .await?;
//!
//! let items = api.list_items().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod response;
pub mod router;
pub mod server;
pub mod transport;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::ApiClient;
pub use config::{AppConfig, ServerSettings, StorageSettings, TransportMode, TransportSettings};
pub use error::{TransportError, TransportResult};
pub use query::{QueryClient, QueryOptions, UnauthorizedBehavior};
pub use response::ApiResponse;
pub use router::{LocalRouter, RouteResponse};
pub use server::{InventoryServer, ServerHandle};
pub use transport::{
    EnvironmentProbe, FixedProbe, HttpTransport, LocalTransport, ShellEnvProbe, Transport,
    TransportKind, TransportSelector,
};
