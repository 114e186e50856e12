//! # WhatStock Server
//!
//! Served-mode backend. A browser client outside the desktop shell talks to
//! this over HTTP and gets the same answers the shell gets in-process.
//!
//! ## Startup
//! ```text
//! load config (defaults → whatstock.toml → WHATSTOCK_* env)
//!        │
//!        ▼
//! open SQLite (migrations run on connect)
//!        │
//!        ▼
//! LocalRouter under api_root ──► InventoryServer::start()
//!        │
//!        ▼
//! wait for Ctrl+C / SIGTERM ──► drain ──► close pool
//! ```
//!
//! Set `WHATSTOCK_CONFIG` to read a config file other than the default.

use std::path::PathBuf;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use whatstock_db::{Database, DbConfig};
use whatstock_transport::{AppConfig, InventoryServer, LocalRouter};

const CONFIG_ENV_VAR: &str = "WHATSTOCK_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,whatstock=debug,sqlx=warn")),
        )
        .init();

    info!("Starting WhatStock server");

    let config_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let config = AppConfig::load(config_path).context("Failed to load configuration")?;

    let db_path = config.storage.resolve_database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
    }
    info!(path = %db_path.display(), "Opening database");

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("Failed to open database")?;
    let (embedded, applied) = db
        .migration_status()
        .await
        .context("Failed to read migration status")?;
    info!(embedded, applied, "Database schema ready");

    let router = LocalRouter::new(db.inventory()).with_api_root(config.transport.api_root.clone());
    let handle = InventoryServer::new(config.server.clone(), router)
        .start()
        .await
        .context("Failed to start server")?;

    info!(url = %handle.base_url(), "WhatStock server listening");

    shutdown_signal().await;

    handle.shutdown().await.context("Server did not shut down cleanly")?;
    db.close().await;

    info!("WhatStock server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
