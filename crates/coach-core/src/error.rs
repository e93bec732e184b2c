//! Error types for the plan/analysis request pipeline.

use thiserror::Error;

/// Substrings that mark an unstructured failure message as rate limiting,
/// quota exhaustion, or a generic RPC transport failure.
const TRANSIENT_MARKERS: &[&str] = &["429", "quota", "RESOURCE_EXHAUSTED", "Rpc failed"];

/// Errors that can occur while building, executing, or decoding an AI request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoachError {
    /// Rate limiting or quota exhaustion; retried by the request client.
    #[error("{0}")]
    Transient(String),

    /// The response text was not valid structured data or missed a required field.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// The caller supplied invalid input before anything was sent.
    #[error("invalid request: {0}")]
    RequestConstruction(String),

    /// The service rejected the request (auth failure, malformed request, ...).
    #[error("{message}")]
    Service {
        /// HTTP status, when the failure came with one.
        status: Option<u16>,
        /// Message reported by the service.
        message: String,
    },

    /// Configuration error (missing API key, invalid settings).
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, CoachError>;

impl CoachError {
    /// Create a schema violation.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaViolation(message.into())
    }

    /// Classify an unstructured failure message.
    ///
    /// Used when the upstream failure carries no status code to inspect.
    pub fn from_service_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_transient_message(&message) {
            Self::Transient(message)
        } else {
            Self::Service {
                status: None,
                message,
            }
        }
    }

    /// Whether the request client should retry after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Whether this error is a schema violation.
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Self::SchemaViolation(_))
    }

    /// The message to show the user, or `fallback` when the error carries none.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

/// Check an error message for rate-limit, quota, or RPC-failure signals.
pub fn is_transient_message(message: &str) -> bool {
    TRANSIENT_MARKERS.iter().any(|marker| message.contains(marker))
}
