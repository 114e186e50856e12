//! # Price Module
//!
//! Decimal currency amounts kept as canonical text.
//!
//! ## Why Text?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  Prices are entered by hand and shown back verbatim. Storing them as    │
//! │  text means "19.99" is exactly "19.99" after any number of saves,       │
//! │  exports and imports.                                                   │
//! │                                                                         │
//! │  Input may arrive as a JSON number (12.5) or a string ("12.50"):        │
//! │    number → canonical text ("12.5")                                     │
//! │    string → kept as-is    ("12.50")                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use whatstock_core::price::Price;
//!
//! let from_form = Price::new("19.99");
//! let from_number = Price::from_f64(2.0);
//!
//! assert_eq!(from_form.as_str(), "19.99");
//! assert_eq!(from_number.as_str(), "2");
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// A decimal amount in its canonical text representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(String);

impl Price {
    /// Wraps text as-is. No numeric validation: the store only coerces types.
    pub fn new(text: impl Into<String>) -> Self {
        Price(text.into())
    }

    /// Converts a float to its shortest round-tripping text.
    ///
    /// Whole numbers drop the fractional part (`2.0` → `"2"`), matching how
    /// the web client stringifies numbers.
    pub fn from_f64(value: f64) -> Self {
        Price(canonical_f64(value))
    }

    /// Converts a JSON number to canonical text.
    pub fn from_number(number: &Number) -> Self {
        if let Some(int) = number.as_i64() {
            return Price(int.to_string());
        }
        if let Some(uint) = number.as_u64() {
            return Price(uint.to_string());
        }
        Price(number.as_f64().map(canonical_f64).unwrap_or_else(|| number.to_string()))
    }

    /// Returns the canonical text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Largest magnitude at which every whole f64 is exactly representable.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

fn canonical_f64(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Price {
    fn from(text: &str) -> Self {
        Price::new(text)
    }
}

impl From<String> for Price {
    fn from(text: String) -> Self {
        Price(text)
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Price::from_f64(value)
    }
}

/// Accepts a JSON string (kept verbatim) or a JSON number (canonicalised).
impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(text) => Ok(Price(text)),
            Value::Number(number) => Ok(Price::from_number(&number)),
            other => Err(serde::de::Error::custom(format!(
                "expected a number or numeric string, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_are_kept_verbatim() {
        assert_eq!(Price::new("1.00").as_str(), "1.00");
        let price: Price = serde_json::from_str("\"0019.9\"").unwrap();
        assert_eq!(price.as_str(), "0019.9");
    }

    #[test]
    fn test_numbers_are_canonicalised() {
        let cases = [("2", "2"), ("2.0", "2"), ("12.5", "12.5"), ("-3", "-3"), ("0.1", "0.1")];
        for (json, expected) in cases {
            let price: Price = serde_json::from_str(json).unwrap();
            assert_eq!(price.as_str(), expected, "input {}", json);
        }
    }

    #[test]
    fn test_float_drift_is_preserved_not_hidden() {
        assert_eq!(Price::from_f64(0.1 + 0.2).as_str(), "0.30000000000000004");
    }

    #[test]
    fn test_rejects_non_numeric_json() {
        assert!(serde_json::from_str::<Price>("true").is_err());
        assert!(serde_json::from_str::<Price>("[1]").is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&Price::from_f64(4.25)).unwrap(), "\"4.25\"");
    }
}
