//! Typed boundary over the analysis service REST API.
//!
//! `ApiClient` shapes requests and decodes responses; the actual I/O goes
//! through a [`Transport`], so the boundary can run against a mock in tests.

mod client;
mod transport;

pub use client::{ApiClient, ApiResponse, DocumentTypeCatalog, HealthStatus};
pub use transport::{ApiRequest, HttpTransport, Method, RawResponse, Transport, Upload};

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Failures from the API boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Connection failure or non-success status. `message` is the server's
    /// own message when the error body carried one.
    #[error("network error (status {status:?}): {}", .message.as_deref().unwrap_or("no message"))]
    Network {
        status: Option<u16>,
        message: Option<String>,
    },

    /// No response within the configured bound.
    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    /// Success status but a body that does not match the expected shape.
    #[error("could not decode response (status {status}): {detail}")]
    Decode { status: u16, detail: String },
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl ApiError {
    /// Build the error for a non-success response, preferring the body's
    /// `message` field, then its `error` field.
    pub fn from_error_body(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let text = |v: Option<serde_json::Value>| match v {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        };
        let message = text(parsed.message).or_else(|| text(parsed.error));
        ApiError::Network {
            status: Some(status),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network { status, .. } => *status,
            ApiError::Decode { status, .. } => Some(*status),
            ApiError::Timeout { .. } => None,
        }
    }
}
