//! # Error Types
//!
//! Domain-specific error types for whatstock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  whatstock-core errors (this file)                                     │
//! │  ├── CoreError        - Collection encode/decode failures              │
//! │  └── ValidationError  - Unparseable labels and timestamps              │
//! │                                                                         │
//! │  whatstock-db errors                                                   │
//! │  └── DbError          - Storage failures                               │
//! │                                                                         │
//! │  whatstock-transport errors                                            │
//! │  └── TransportError   - What callers of the façade see                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → TransportError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no "not found" variant: lookups return `Option` and the
//! router turns `None` into a 404.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while moving the item collection in and out of text.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Import payload did not parse, or was not an array.
    ///
    /// ## When This Occurs
    /// - `"{not valid json"` (syntax error)
    /// - `"{}"` (valid JSON, but not a sequence)
    #[error("Malformed import: {0}")]
    MalformedImport(String),

    /// Persisted container content could not be decoded.
    #[error("Malformed persisted collection: {0}")]
    MalformedPersisted(String),

    /// Collection could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input coercion errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Invalid format (e.g., unparseable timestamp).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
