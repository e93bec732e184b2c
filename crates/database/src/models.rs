//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored state slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StoredSlot {
    /// Slot name (e.g., "profile", "journal", "plan")
    pub slot: String,
    /// Serialized JSON document.
    pub payload: String,
    /// Last update timestamp.
    pub updated_at: String,
}
