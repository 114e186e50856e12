//! # API Response
//!
//! The uniform result of a façade request, whichever transport answered it.

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{TransportError, TransportResult};
use crate::router::RouteResponse;

/// Status and JSON body of an answered request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    body: Value,
}

impl ApiResponse {
    /// Creates a response.
    pub fn new(status: StatusCode, body: Value) -> Self {
        ApiResponse { status, body }
    }

    /// Returns the HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// True for 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the JSON body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consumes the response, returning the JSON body.
    pub fn into_body(self) -> Value {
        self.body
    }

    /// Deserializes the body into `T`.
    pub fn json<T: DeserializeOwned>(self) -> TransportResult<T> {
        Ok(serde_json::from_value(self.body)?)
    }

    /// Body as text the way a server would have sent it.
    pub fn text(&self) -> String {
        match &self.body {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    /// Turns a non-2xx response into the error a served request raises.
    ///
    /// ```rust
    /// use http::StatusCode;
    /// use serde_json::json;
    /// use whatstock_transport::ApiResponse;
    ///
    /// let missing = ApiResponse::new(StatusCode::NOT_FOUND, json!({ "error": "Not found" }));
    /// let err = missing.error_for_status().unwrap_err();
    /// assert_eq!(err.to_string(), r#"404: {"error":"Not found"}"#);
    /// ```
    pub fn error_for_status(self) -> TransportResult<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let text = self.text();
        let body = if text.is_empty() {
            self.status.canonical_reason().unwrap_or_default().to_string()
        } else {
            text
        };

        Err(TransportError::Http {
            status: self.status.as_u16(),
            body,
        })
    }
}

impl From<RouteResponse> for ApiResponse {
    fn from(response: RouteResponse) -> Self {
        ApiResponse::new(response.status, response.body)
    }
}
