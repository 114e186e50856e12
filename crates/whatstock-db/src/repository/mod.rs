//! # Repository Module
//!
//! Storage access for WhatStock.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  LocalRouter                                                           │
//! │       │  db.inventory().create(input)                                   │
//! │       ▼                                                                 │
//! │  InventoryStore       ← item semantics, write lock, corruption policy  │
//! │       │  get / put / remove ("whatstock_inventory")                     │
//! │       ▼                                                                 │
//! │  ContainerRepository  ← opaque named slots                              │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  kv_store table                                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ContainerRepository`](container::ContainerRepository) - Named text slots
//! - [`InventoryStore`](inventory::InventoryStore) - Item operations

pub mod container;
pub mod inventory;
