//! # Inventory Store
//!
//! All item operations over the collection kept in the
//! [`STORAGE_KEY`] container slot.
//!
//! ## Read-Modify-Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create / update / delete / mark_sold / unmark_sold / import / clear    │
//! │                                                                         │
//! │   lock ──► load slot ──► decode ──► change Vec ──► encode ──► write     │
//! │    │                                                           │        │
//! │    └─────────────── held until the write lands ────────────────┘        │
//! │                                                                         │
//! │  get_all / get_one / export_all                                         │
//! │                                                                         │
//! │   load slot ──► decode            (no lock)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Corrupt Content
//! A slot that no longer decodes reads as an empty collection and is logged
//! at WARN. The next successful write replaces it.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use whatstock_core::collection;
use whatstock_core::{InventoryItem, InventoryItemPatch, NewInventoryItem, Timestamp, STORAGE_KEY};

use crate::error::DbResult;
use crate::repository::container::ContainerRepository;

/// The item store. Obtain one with [`crate::Database::inventory`].
#[derive(Debug, Clone)]
pub struct InventoryStore {
    container: ContainerRepository,
    write_lock: Arc<Mutex<()>>,
}

impl InventoryStore {
    /// Creates a store over `container`, serializing writes on `write_lock`.
    pub fn new(container: ContainerRepository, write_lock: Arc<Mutex<()>>) -> Self {
        InventoryStore {
            container,
            write_lock,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns every item in insertion order.
    pub async fn get_all(&self) -> DbResult<Vec<InventoryItem>> {
        self.load().await
    }

    /// Finds an item by id.
    pub async fn get_one(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let items = self.load().await?;
        Ok(items.into_iter().find(|item| item.id == id))
    }

    /// Serializes the whole collection as a pretty-printed JSON array.
    pub async fn export_all(&self) -> DbResult<String> {
        let items = self.load().await?;
        debug!(count = items.len(), "Exporting inventory");
        Ok(collection::encode_pretty(&items)?)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates an item with a fresh id and `createdAt = now`, appending it.
    pub async fn create(&self, input: NewInventoryItem) -> DbResult<InventoryItem> {
        let _guard = self.write_lock.lock().await;

        let mut items = self.load().await?;
        let item = input.into_item(Uuid::new_v4().to_string(), Timestamp::now());
        items.push(item.clone());
        self.save(&items).await?;

        debug!(id = %item.id, title = %item.title, "Created item");
        Ok(item)
    }

    /// Overlays `patch` onto the item with `id`.
    ///
    /// Returns `None` (and writes nothing) when no item has that id.
    pub async fn update(
        &self,
        id: &str,
        patch: InventoryItemPatch,
    ) -> DbResult<Option<InventoryItem>> {
        let _guard = self.write_lock.lock().await;

        let mut items = self.load().await?;
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            debug!(id = %id, "Update target not found");
            return Ok(None);
        };

        if patch.is_empty() {
            debug!(id = %id, "Empty patch, nothing to write");
            return Ok(Some(item.clone()));
        }

        patch.apply_to(item);
        let updated = item.clone();
        self.save(&items).await?;

        debug!(id = %id, status = %updated.status, "Updated item");
        Ok(Some(updated))
    }

    /// Removes the item with `id`. Writes only if something was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let _guard = self.write_lock.lock().await;

        let mut items = self.load().await?;
        let before = items.len();
        items.retain(|item| item.id != id);

        if items.len() == before {
            debug!(id = %id, "Delete target not found");
            return Ok(false);
        }

        self.save(&items).await?;
        debug!(id = %id, "Deleted item");
        Ok(true)
    }

    /// Marks an item sold to the given buyer, stamping `soldDate = now`.
    pub async fn mark_sold(
        &self,
        id: &str,
        buyer_name: &str,
        buyer_email: &str,
    ) -> DbResult<Option<InventoryItem>> {
        let patch = InventoryItemPatch::mark_sold(buyer_name, buyer_email, Timestamp::now());
        self.update(id, patch).await
    }

    /// Returns an item to stock, clearing buyer fields and `soldDate`.
    pub async fn unmark_sold(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        self.update(id, InventoryItemPatch::unmark_sold()).await
    }

    /// Replaces the whole collection with an exported JSON array.
    ///
    /// Any array is accepted. Records missing an `id` get a fresh one, and
    /// elements that can't become an item are dropped with a WARN. Returns
    /// `false` and leaves the collection untouched when `text` doesn't parse
    /// or isn't an array.
    pub async fn import_all(&self, text: &str) -> DbResult<bool> {
        let imported = match collection::decode_import(text, || Uuid::new_v4().to_string()) {
            Ok(imported) => imported,
            Err(e) => {
                warn!(error = %e, "Rejected inventory import");
                return Ok(false);
            }
        };

        if imported.skipped > 0 {
            warn!(skipped = imported.skipped, "Dropped import elements that are not items");
        }

        let _guard = self.write_lock.lock().await;
        self.save(&imported.items).await?;

        info!(count = imported.items.len(), "Imported inventory");
        Ok(true)
    }

    /// Removes the collection slot entirely.
    pub async fn clear_all(&self) -> DbResult<()> {
        let _guard = self.write_lock.lock().await;
        self.container.remove(STORAGE_KEY).await?;

        info!("Cleared inventory");
        Ok(())
    }

    // =========================================================================
    // Slot I/O
    // =========================================================================

    async fn load(&self) -> DbResult<Vec<InventoryItem>> {
        let Some(text) = self.container.get(STORAGE_KEY).await? else {
            return Ok(Vec::new());
        };

        match collection::decode_persisted(&text) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!(error = %e, "Stored inventory is unreadable, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, items: &[InventoryItem]) -> DbResult<()> {
        let text = collection::encode_compact(items)?;
        self.container.put(STORAGE_KEY, &text).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
