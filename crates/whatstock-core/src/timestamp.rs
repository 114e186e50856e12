//! # Timestamp
//!
//! A UTC instant with millisecond precision and an explicit text form.
//!
//! ## Why a Dedicated Type?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Item records cross a JSON boundary on every load, import and HTTP     │
//! │  call. Timestamps are text on the wire and instants in memory:          │
//! │                                                                         │
//! │    "2024-05-01T12:00:00.000Z" ──parse──► Timestamp ──format──► text    │
//! │                                                                         │
//! │  Precision is fixed at milliseconds on BOTH sides, so a record that     │
//! │  was just created compares equal to the same record after it was        │
//! │  persisted and read back.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lenient Load Helpers
//! Persisted and imported records go through [`lenient_or_now`] (for
//! `createdAt`) and [`lenient_optional`] (for `soldDate`). Neither ever fails:
//! an unreadable `createdAt` becomes "now", an unreadable `soldDate` becomes
//! absent.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::ValidationError;

/// A point in time, UTC, truncated to whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current instant, truncated to milliseconds.
    pub fn now() -> Self {
        Timestamp(Utc::now().trunc_subsecs(3))
    }

    /// Wraps a chrono instant, truncating sub-millisecond precision.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Timestamp(at.trunc_subsecs(3))
    }

    /// Builds a timestamp from milliseconds since the Unix epoch.
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Timestamp)
    }

    /// Parses the text forms found in persisted and imported data.
    ///
    /// ## Accepted Forms
    /// - RFC 3339 / ISO-8601 with offset: `2024-05-01T12:00:00.000Z`
    /// - Naive date-time, read as UTC: `2024-05-01T12:00:00`, `2024-05-01 12:00:00`
    /// - Bare date, read as UTC midnight: `2024-05-01`
    /// - Year and month, or a bare year, read as the first day: `2024-05`, `2024`
    /// - Integer milliseconds since the epoch, five digits or more: `1714564800000`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(at) = DateTime::parse_from_rfc3339(text) {
            return Some(Self::from_datetime(at.with_timezone(&Utc)));
        }

        for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
                return Some(Self::from_datetime(naive.and_utc()));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Self::from_datetime(naive.and_utc()));
        }

        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d") {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Self::from_datetime(naive.and_utc()));
        }

        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.len() <= 4 && digits.len() == text.len() {
            return text
                .parse::<i32>()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| Self::from_datetime(naive.and_utc()));
        }
        text.parse::<i64>().ok().and_then(Self::from_millis)
    }

    /// Parses a JSON value: a string in any [`Timestamp::parse`] form, or a
    /// number of epoch milliseconds.
    pub fn parse_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Self::parse(text),
            Value::Number(number) => number.as_i64().and_then(Self::from_millis),
            _ => None,
        }
    }

    /// Formats as ISO-8601 UTC with milliseconds, e.g. `2024-05-01T12:00:00.000Z`.
    pub fn format(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Returns the underlying chrono instant.
    #[inline]
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for Timestamp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s).ok_or_else(|| ValidationError::InvalidFormat {
            field: "timestamp".to_string(),
            reason: format!("'{}' is not a recognised date", s),
        })
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Timestamp::from_datetime(at)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

/// Strict deserialization: the value must be a parseable string or epoch
/// milliseconds. Used for caller-supplied input such as partial updates.
impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Timestamp::parse_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", value)))
    }
}

// =============================================================================
// Lenient Field Helpers
// =============================================================================

/// `createdAt` loader: anything absent, null or unparseable becomes "now".
///
/// Pair with `#[serde(default = "Timestamp::now")]` so a missing key is
/// covered too.
pub fn lenient_or_now<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Timestamp::parse_value)
        .unwrap_or_else(Timestamp::now))
}

/// `soldDate` loader: anything absent, null or unparseable stays absent.
pub fn lenient_optional<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Timestamp::parse_value))
}
