//! # Domain Types
//!
//! The inventory item and the two input shapes that produce or change it.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  NewInventoryItem ──into_item(id, now)──► InventoryItem                 │
//! │  (caller input,                           (persisted record,            │
//! │   most fields optional)                    defaults applied)            │
//! │                                                │                        │
//! │  InventoryItemPatch ──apply_to(&mut item)──────┘                        │
//! │  (every field independently present/absent;                             │
//! │   nullable fields distinguish "omitted" from "cleared")                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! Field names are camelCase on the wire and absent optionals are `null`,
//! so an export written here reads back in the web client unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::price::Price;
use crate::timestamp::{self, Timestamp};
use crate::DEFAULT_QUANTITY;

// =============================================================================
// Item Status
// =============================================================================

/// Whether an item is still on the shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Available for sale.
    #[default]
    InStock,
    /// Sold; buyer details and sold date are set.
    Sold,
}

impl ItemStatus {
    /// Wire label of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::InStock => "in_stock",
            ItemStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(ItemStatus::InStock),
            "sold" => Ok(ItemStatus::Sold),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["in_stock".to_string(), "sold".to_string()],
            }),
        }
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

/// A single tracked item.
///
/// ## Invariants
/// - `id` and `created_at` never change after creation
/// - `status == Sold` ⇔ `buyer_name`, `buyer_email`, `sold_date` are all set,
///   as long as the item is only moved between states with
///   [`InventoryItemPatch::mark_sold`] / [`InventoryItemPatch::unmark_sold`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Unique identifier (UUID v4), assigned by the store.
    pub id: String,

    pub title: String,

    pub category: String,

    #[serde(default)]
    pub sub_category: Option<String>,

    /// Condition label, e.g. "mint", "good", "poor".
    pub condition: String,

    #[ts(as = "String")]
    pub purchase_price: Price,

    #[ts(as = "String")]
    pub selling_price: Price,

    #[serde(default = "default_quantity")]
    pub quantity: u32,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub weight: Option<Price>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    /// Ordered labels. Duplicates are filtered by the client, not here.
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    pub status: ItemStatus,

    #[serde(default)]
    pub buyer_name: Option<String>,

    #[serde(default)]
    pub buyer_email: Option<String>,

    #[serde(default, deserialize_with = "timestamp::lenient_optional")]
    #[ts(as = "Option<String>")]
    pub sold_date: Option<Timestamp>,

    /// 1 when the item left inventory without revenue.
    #[serde(default)]
    pub is_giveaway: u8,

    #[serde(
        default = "Timestamp::now",
        deserialize_with = "timestamp::lenient_or_now"
    )]
    #[ts(as = "String")]
    pub created_at: Timestamp,
}

// =============================================================================
// New Inventory Item
// =============================================================================

/// Input for creating an item. Everything but the identity of the item is
/// optional and defaulted by [`NewInventoryItem::into_item`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub title: String,
    pub category: String,
    pub condition: String,
    #[ts(as = "String")]
    pub purchase_price: Price,
    #[ts(as = "String")]
    pub selling_price: Price,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub weight: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::lenient_optional"
    )]
    #[ts(as = "Option<String>")]
    pub sold_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_giveaway: Option<u8>,
}

impl NewInventoryItem {
    /// Creates an input with only the required fields set.
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        condition: impl Into<String>,
        purchase_price: impl Into<Price>,
        selling_price: impl Into<Price>,
    ) -> Self {
        NewInventoryItem {
            title: title.into(),
            category: category.into(),
            condition: condition.into(),
            purchase_price: purchase_price.into(),
            selling_price: selling_price.into(),
            quantity: None,
            status: None,
            sub_category: None,
            weight: None,
            description: None,
            image_url: None,
            tags: None,
            buyer_name: None,
            buyer_email: None,
            sold_date: None,
            is_giveaway: None,
        }
    }

    /// Builds the persisted record, coalescing defaults.
    ///
    /// ## Defaults
    /// ```text
    /// quantity     → 1
    /// status       → in_stock
    /// subCategory, weight, description, imageUrl, tags,
    /// buyerName, buyerEmail, soldDate → absent
    /// isGiveaway   → 0
    /// ```
    /// Prices were already canonicalised when the input was deserialized.
    pub fn into_item(self, id: String, created_at: Timestamp) -> InventoryItem {
        InventoryItem {
            id,
            title: self.title,
            category: self.category,
            condition: self.condition,
            purchase_price: self.purchase_price,
            selling_price: self.selling_price,
            quantity: self.quantity.unwrap_or(DEFAULT_QUANTITY),
            status: self.status.unwrap_or_default(),
            sub_category: self.sub_category,
            weight: self.weight,
            description: self.description,
            image_url: self.image_url,
            tags: self.tags,
            buyer_name: self.buyer_name,
            buyer_email: self.buyer_email,
            sold_date: self.sold_date,
            is_giveaway: self.is_giveaway.unwrap_or(0),
            created_at,
        }
    }
}

// =============================================================================
// Partial Update
// =============================================================================

/// Deserializes a present key (even `null`) as `Some(..)`; combined with
/// `#[serde(default)]` a missing key stays `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A shallow overlay onto an existing item.
///
/// ## Presence Semantics
/// ```text
/// Field kind        Type                 JSON key missing   JSON null     JSON value
/// ───────────────   ──────────────────   ────────────────   ───────────   ──────────
/// required field    Option<T>            untouched          untouched     replaced
/// nullable field    Option<Option<T>>    untouched          cleared       replaced
/// ```
///
/// `id` and `createdAt` have no field here, so no update can touch them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_giveaway: Option<u8>,

    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub weight: Option<Option<Price>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub sold_date: Option<Option<Timestamp>>,
}

impl InventoryItemPatch {
    /// The transition into `sold`.
    pub fn mark_sold(
        buyer_name: impl Into<String>,
        buyer_email: impl Into<String>,
        sold_at: Timestamp,
    ) -> Self {
        InventoryItemPatch {
            status: Some(ItemStatus::Sold),
            buyer_name: Some(Some(buyer_name.into())),
            buyer_email: Some(Some(buyer_email.into())),
            sold_date: Some(Some(sold_at)),
            ..Default::default()
        }
    }

    /// The transition back to `in_stock`, explicitly clearing buyer fields.
    pub fn unmark_sold() -> Self {
        InventoryItemPatch {
            status: Some(ItemStatus::InStock),
            buyer_name: Some(None),
            buyer_email: Some(None),
            sold_date: Some(None),
            ..Default::default()
        }
    }

    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        *self == InventoryItemPatch::default()
    }

    /// Overlays every present field onto `item`.
    pub fn apply_to(self, item: &mut InventoryItem) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut item.title, self.title);
        set(&mut item.category, self.category);
        set(&mut item.condition, self.condition);
        set(&mut item.purchase_price, self.purchase_price);
        set(&mut item.selling_price, self.selling_price);
        set(&mut item.quantity, self.quantity);
        set(&mut item.status, self.status);
        set(&mut item.is_giveaway, self.is_giveaway);
        set(&mut item.sub_category, self.sub_category);
        set(&mut item.weight, self.weight);
        set(&mut item.description, self.description);
        set(&mut item.image_url, self.image_url);
        set(&mut item.tags, self.tags);
        set(&mut item.buyer_name, self.buyer_name);
        set(&mut item.buyer_email, self.buyer_email);
        set(&mut item.sold_date, self.sold_date);
    }
}

// =============================================================================
// Buyer Details
// =============================================================================

/// Body of `POST /inventory/{id}/sold`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BuyerDetails {
    pub buyer_name: String,
    pub buyer_email: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> InventoryItem {
        NewInventoryItem::new("Card", "trading-cards", "mint", "1.00", "2.00")
            .into_item("id-1".to_string(), Timestamp::now())
    }

    #[test]
    fn test_status_default_and_labels() {
        assert_eq!(ItemStatus::default(), ItemStatus::InStock);
        assert_eq!(ItemStatus::Sold.to_string(), "sold");
        assert_eq!("in_stock".parse::<ItemStatus>().unwrap(), ItemStatus::InStock);
        assert!("gone".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_into_item_applies_defaults() {
        let item = sample_item();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.status, ItemStatus::InStock);
        assert_eq!(item.is_giveaway, 0);
        assert!(item.sub_category.is_none());
        assert!(item.weight.is_none());
        assert!(item.tags.is_none());
        assert!(item.buyer_name.is_none());
        assert!(item.sold_date.is_none());
    }

    #[test]
    fn test_new_item_from_json_with_numeric_prices() {
        let input: NewInventoryItem = serde_json::from_value(json!({
            "title": "Lamp",
            "category": "home",
            "condition": "good",
            "purchasePrice": 5,
            "sellingPrice": 12.5,
            "weight": 1.25,
            "quantity": 3
        }))
        .unwrap();

        let item = input.into_item("id-2".to_string(), Timestamp::now());
        assert_eq!(item.purchase_price.as_str(), "5");
        assert_eq!(item.selling_price.as_str(), "12.5");
        assert_eq!(item.weight.as_ref().map(Price::as_str), Some("1.25"));
        assert_eq!(item.quantity, 3);
    }

    #[test]
    fn test_item_wire_shape_uses_camel_case_and_nulls() {
        let item = sample_item();
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["purchasePrice"], json!("1.00"));
        assert_eq!(value["status"], json!("in_stock"));
        assert_eq!(value["subCategory"], json!(null));
        assert_eq!(value["isGiveaway"], json!(0));
        assert!(value["createdAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        let mut item = sample_item();
        let before = item.clone();

        let patch: InventoryItemPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
        patch.apply_to(&mut item);

        assert_eq!(item, before);
    }

    #[test]
    fn test_patch_distinguishes_missing_from_null() {
        let mut item = sample_item();
        item.description = Some("boxed".to_string());
        item.image_url = Some("img.png".to_string());

        let patch: InventoryItemPatch =
            serde_json::from_value(json!({ "description": null, "title": "Card v2" })).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.image_url, None);
        patch.apply_to(&mut item);

        assert_eq!(item.title, "Card v2");
        assert!(item.description.is_none());
        assert_eq!(item.image_url.as_deref(), Some("img.png"));
    }

    #[test]
    fn test_patch_ignores_identity_fields() {
        let mut item = sample_item();
        let before = item.clone();

        let patch: InventoryItemPatch = serde_json::from_value(json!({
            "id": "hijacked",
            "createdAt": "1999-01-01T00:00:00.000Z"
        }))
        .unwrap();
        patch.apply_to(&mut item);

        assert_eq!(item.id, before.id);
        assert_eq!(item.created_at, before.created_at);
    }

    #[test]
    fn test_mark_then_unmark_sold() {
        let mut item = sample_item();
        let at = Timestamp::now();

        InventoryItemPatch::mark_sold("Alice", "a@x.com", at).apply_to(&mut item);
        assert_eq!(item.status, ItemStatus::Sold);
        assert_eq!(item.buyer_name.as_deref(), Some("Alice"));
        assert_eq!(item.buyer_email.as_deref(), Some("a@x.com"));
        assert_eq!(item.sold_date, Some(at));

        InventoryItemPatch::unmark_sold().apply_to(&mut item);
        assert_eq!(item.status, ItemStatus::InStock);
        assert!(item.buyer_name.is_none());
        assert!(item.buyer_email.is_none());
        assert!(item.sold_date.is_none());
    }

    #[test]
    fn test_unmark_sold_serializes_explicit_nulls() {
        let value = serde_json::to_value(InventoryItemPatch::unmark_sold()).unwrap();
        assert_eq!(value, json!({
            "status": "in_stock",
            "buyerName": null,
            "buyerEmail": null,
            "soldDate": null
        }));

        let back: InventoryItemPatch = serde_json::from_value(value).unwrap();
        assert_eq!(back, InventoryItemPatch::unmark_sold());
    }

    #[test]
    fn test_item_load_is_lenient_on_dates() {
        let item: InventoryItem = serde_json::from_value(json!({
            "id": "x",
            "title": "Old",
            "category": "misc",
            "condition": "fair",
            "purchasePrice": "1",
            "sellingPrice": "2",
            "createdAt": "not-a-date",
            "soldDate": "also-not-a-date"
        }))
        .unwrap();

        assert!(item.sold_date.is_none());
        assert_eq!(item.quantity, 1);
        assert_eq!(item.is_giveaway, 0);
    }
}
