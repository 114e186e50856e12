//! # whatstock-db: Durable Storage for WhatStock
//!
//! This crate owns the inventory collection. It uses SQLite with sqlx for
//! async access; the collection itself is one JSON document in a named slot.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        WhatStock Data Flow                              │
//! │                                                                         │
//! │  LocalRouter (GET /inventory)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    whatstock-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ InventoryStore │   │              │   │   │
//! │  │   │ SqlitePool    │◄───│ Container      │   │ 001_kv_store │   │   │
//! │  │   │ write lock    │    │                │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite: kv_store['whatstock_inventory'] = "[{...}, {...}]"    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use whatstock_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/whatstock.db")).await?;
//!
//! let item = db.inventory().create(new_item).await?;
//! let sold = db.inventory().mark_sold(&item.id, "Alice", "a@x.com").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::container::ContainerRepository;
pub use repository::inventory::InventoryStore;
