// Error handling module
// Defines the normalized error shape surfaced to all callers

use serde_json::Value;
use thiserror::Error;

/// Error surfaced to callers of the client.
///
/// Every failure, whatever its origin, is reduced to this shape before it
/// leaves the client: a human-readable message, the HTTP status when one
/// exists, and the raw response payload when it could be parsed. This is the
/// only error contract calling code may rely on.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
    pub data: Option<Value>,
}

impl ApiError {
    /// Network-level failure: no response, no status to classify.
    pub fn transport(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            status: None,
            data: None,
        }
    }

    /// Normalize an HTTP failure from its status and raw body. The payload's
    /// `message` field wins when present.
    pub fn from_status(status: u16, body: &str) -> Self {
        let data: Option<Value> = serde_json::from_str(body).ok();
        let message = data
            .as_ref()
            .and_then(|payload| payload.get("message"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("request failed with status {}", status));

        Self {
            message,
            status: Some(status),
            data,
        }
    }

    /// A 2xx response whose body could not be deserialized.
    pub fn decode(status: u16, err: serde_json::Error) -> Self {
        Self {
            message: format!("failed to decode response body: {}", err),
            status: Some(status),
            data: None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;
