//! Application state for the nutrition coach.
//!
//! - [`StateStore`] - Storage seam for the profile, journal and plan slots
//! - [`AppState`] - The three durable records, owned by a [`Reconciler`]
//! - [`Reconciler`] - The only code path that changes durable state
//! - [`CaptureSession`] - The client-local meal capture flow
//!
//! # Example
//!
//! ```rust
//! use coach_state::{MemoryStateStore, ProfileChange, Reconciler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), coach_state::StateError> {
//!     let mut reconciler = Reconciler::open(MemoryStateStore::new()).await?;
//!     reconciler
//!         .update_profile([ProfileChange::parse("weight", "82")?])
//!         .await?;
//!     assert_eq!(reconciler.profile().weight, 82.0);
//!     Ok(())
//! }
//! ```

mod capture;
mod error;
mod profile;
mod reconciler;
mod state;
mod store;

pub use capture::{
    portion_range, AnalysisTicket, CaptureSession, CaptureState, Completion, Review,
    DEFAULT_PORTION,
};
pub use error::{Result, StateError};
pub use profile::ProfileChange;
pub use reconciler::{
    validate_portion, BookmarkOutcome, Reconciler, ALREADY_BOOKMARKED, POINTS_PER_MEAL,
};
pub use state::AppState;
pub use store::{MemoryStateStore, Slot, SqliteStateStore, StateStore};
