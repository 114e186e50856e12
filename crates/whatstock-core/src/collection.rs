//! # Collection Codec
//!
//! The whole item collection is one JSON array. These helpers move it in and
//! out of text for the durable container and for export/import.
//!
//! ```text
//! container slot ──decode_persisted──► Vec<InventoryItem> ──encode_compact──► slot
//! import text    ──decode_import────►  Vec<InventoryItem> (+ skipped count)
//!                                      Vec<InventoryItem> ──encode_pretty───► export text
//! ```

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::types::InventoryItem;

/// Decodes the container slot.
///
/// Records are loaded leniently: a missing or unreadable `createdAt` becomes
/// "now", a missing or unreadable `soldDate` becomes absent.
pub fn decode_persisted(text: &str) -> CoreResult<Vec<InventoryItem>> {
    serde_json::from_str(text).map_err(|e| CoreError::MalformedPersisted(e.to_string()))
}

/// Result of decoding an import payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedCollection {
    /// Records that became items, in payload order.
    pub items: Vec<InventoryItem>,
    /// Elements that could not become an item and were dropped.
    pub skipped: usize,
}

/// Decodes an import payload.
///
/// Any JSON array is accepted. Each element is decoded on its own:
/// - a record without a usable `id` gets one from `new_id`
/// - missing optional fields take the same defaults `create` applies
/// - an element that still isn't an item (a scalar, or a record missing
///   `title`, `category`, `condition` or a price) is dropped and counted
///
/// Text that doesn't parse, or parses to anything but an array, is rejected.
pub fn decode_import(
    text: &str,
    mut new_id: impl FnMut() -> String,
) -> CoreResult<ImportedCollection> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| CoreError::MalformedImport(e.to_string()))?;

    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            return Err(CoreError::MalformedImport(format!(
                "expected an array, got {}",
                kind_of(&other)
            )))
        }
    };

    let mut imported = ImportedCollection {
        items: Vec::with_capacity(elements.len()),
        skipped: 0,
    };

    for element in elements {
        let Value::Object(mut record) = element else {
            imported.skipped += 1;
            continue;
        };

        let id = match record.get("id") {
            Some(Value::String(id)) if !id.is_empty() => None,
            Some(Value::Number(number)) => Some(number.to_string()),
            _ => Some(new_id()),
        };
        if let Some(id) = id {
            record.insert("id".to_string(), Value::String(id));
        }

        match serde_json::from_value(Value::Object(record)) {
            Ok(item) => imported.items.push(item),
            Err(_) => imported.skipped += 1,
        }
    }

    Ok(imported)
}

/// Compact text for the container slot.
pub fn encode_compact(items: &[InventoryItem]) -> CoreResult<String> {
    serde_json::to_string(items).map_err(|e| CoreError::Serialization(e.to_string()))
}

/// Pretty-printed text (2-space indent) for export.
pub fn encode_pretty(items: &[InventoryItem]) -> CoreResult<String> {
    serde_json::to_string_pretty(items).map_err(|e| CoreError::Serialization(e.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
