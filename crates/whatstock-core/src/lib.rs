//! # whatstock-core: Domain Model for WhatStock
//!
//! Everything both transports must agree on lives here: the item record,
//! how defaults are coalesced at creation, how partial updates overlay a
//! record, and how timestamps and prices cross the JSON boundary.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        WhatStock Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   Request Façade (whatstock-transport)                          │   │
//! │  │   hosted ──► LocalRouter          served ──► HTTP ──► server    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   Item Store (whatstock-db)                                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ whatstock-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌────────────┐  │   │
//! │  │   │   types   │  │ timestamp │  │   price   │  │ collection │  │   │
//! │  │   │   Item    │  │ Timestamp │  │   Price   │  │ encode/    │  │   │
//! │  │   │   Patch   │  │ parse/fmt │  │ canonical │  │ decode     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `InventoryItem`, `NewInventoryItem`, `InventoryItemPatch`
//! - [`timestamp`] - `Timestamp` with explicit parse/format
//! - [`price`] - `Price`, decimal amounts kept as canonical text
//! - [`collection`] - whole-collection JSON encode/decode
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use whatstock_core::{NewInventoryItem, Price, Timestamp};
//!
//! let new_item = NewInventoryItem::new(
//!     "Charizard Holo",
//!     "trading-cards",
//!     "mint",
//!     Price::from_f64(12.5),
//!     Price::new("40.00"),
//! );
//! let item = new_item.into_item("item-1".to_string(), Timestamp::now());
//!
//! assert_eq!(item.quantity, 1);
//! assert_eq!(item.purchase_price.as_str(), "12.5");
//! ```

pub mod collection;
pub mod error;
pub mod price;
pub mod timestamp;
pub mod types;

pub use error::{CoreError, CoreResult, ValidationError};
pub use price::Price;
pub use timestamp::Timestamp;
pub use types::*;

/// Name of the durable container slot holding the whole item collection.
pub const STORAGE_KEY: &str = "whatstock_inventory";

/// Fixed prefix of every inventory endpoint on the wire.
pub const API_ROOT: &str = "/api";

/// Quantity assigned when a new item does not specify one.
pub const DEFAULT_QUANTITY: u32 = 1;
