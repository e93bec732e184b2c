//! Error types for state handling.

use coach_core::CoachError;
use database::DatabaseError;
use thiserror::Error;

use crate::store::Slot;

/// Errors that can occur while reading or changing application state.
#[derive(Debug, Error)]
pub enum StateError {
    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(#[from] DatabaseError),

    /// The store refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A slot could not be serialized.
    #[error("failed to encode {slot} slot: {source}")]
    Encode {
        slot: Slot,
        #[source]
        source: serde_json::Error,
    },

    /// The caller supplied an invalid value.
    #[error(transparent)]
    Invalid(#[from] CoachError),

    /// Unknown profile field name.
    #[error("unknown profile field: {0}")]
    UnknownField(String),

    /// An action was attempted in a capture state that does not allow it.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
}

/// Result type for state operations.
pub type Result<T> = std::result::Result<T, StateError>;

impl StateError {
    /// Create an invalid-input error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(CoachError::RequestConstruction(message.into()))
    }
}
