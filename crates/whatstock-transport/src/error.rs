//! # Transport Error Types
//!
//! Error types for the request façade, its transports, and configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Transport Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │      Wire       │  │     Payload             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http           │  │  SerializationFailed    │ │
//! │  │  InvalidUrl     │  │  ConnectionFail │  │  DeserializationFailed  │ │
//! │  │  ConfigLoad/Save│  │  Timeout        │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Database     │  │     Server      │                              │
//! │  │                 │  │                 │                              │
//! │  │  DatabaseError  │  │  BindFailed     │                              │
//! │  │                 │  │  ChannelError   │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Http` is what a caller sees for any non-2xx answer, whichever transport
//! produced it: served mode raises it directly, hosted mode through
//! [`ApiResponse::error_for_status`](crate::response::ApiResponse::error_for_status).

use thiserror::Error;

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport error type covering all request and setup failures.
#[derive(Debug, Error)]
pub enum TransportError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid base URL.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Wire Errors
    // =========================================================================
    /// Non-2xx answer. Displays as `"{status}: {body}"`.
    #[error("{status}: {body}")]
    Http { status: u16, body: String },

    /// Could not reach the server.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    // =========================================================================
    // Payload Errors
    // =========================================================================
    /// Failed to serialize a request body.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Response body did not have the expected shape.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    // =========================================================================
    // Storage / Server Errors
    // =========================================================================
    /// Opening the local store failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Server could not bind its listener.
    #[error("Failed to bind {addr}: {reason}")]
    BindFailed { addr: String, reason: String },

    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<whatstock_db::DbError> for TransportError {
    fn from(err: whatstock_db::DbError) -> Self {
        TransportError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::DeserializationFailed(err.to_string())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if let Some(status) = err.status() {
            TransportError::Http {
                status: status.as_u16(),
                body: status.canonical_reason().unwrap_or_default().to_string(),
            }
        } else if err.is_decode() {
            TransportError::DeserializationFailed(err.to_string())
        } else {
            TransportError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for TransportError {
    fn from(err: toml::de::Error) -> Self {
        TransportError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for TransportError {
    fn from(err: toml::ser::Error) -> Self {
        TransportError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl TransportError {
    /// The HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for a 401 answer.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Returns true for a 404 answer.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            TransportError::InvalidConfig(_)
                | TransportError::InvalidUrl(_)
                | TransportError::ConfigLoadFailed(_)
                | TransportError::ConfigSaveFailed(_)
        )
    }
}
