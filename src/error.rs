// Error types for the remote catalog service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error types for remote catalog operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiError {
    /// Request did not complete (DNS, connect, timeout, ...)
    Network(String),
    /// Server answered 401 - the session cookie is missing or expired
    AuthRequired,
    /// Server answered a non-2xx status other than 401
    RequestFailed { status: u16, message: String },
    /// Response body did not decode as the expected JSON shape
    MalformedResponse(String),
    /// Caller-side misuse (e.g. matching with no favorites)
    InvalidRequest(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network failure: {}", msg),
            ApiError::AuthRequired => write!(f, "Authentication required"),
            ApiError::RequestFailed { status, message } => {
                write!(f, "Request failed with status {}: {}", status, message)
            }
            ApiError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Map a transport-level reqwest error to a typed error.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }

    /// Map a body-decode reqwest error to a typed error.
    pub(crate) fn from_decode(err: reqwest::Error) -> Self {
        ApiError::MalformedResponse(err.to_string())
    }
}
