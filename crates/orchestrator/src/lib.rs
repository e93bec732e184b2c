//! Top-level controller for the nutrition coach.
//!
//! This crate provides the [`Coach`] type, which owns the application state
//! and connects the AI services to the reconciler.
//!
//! # Architecture
//!
//! ```text
//!  profile edits ------------------------------+
//!                                              |
//!  generate plan -> PlanService ---------------+
//!                                              v
//!  capture -> MealAnalysisService -> review -> Reconciler -> StateStore
//!             (CaptureSession)       (portion)
//! ```
//!
//! Failures of either AI service come back as a single user-facing message
//! and leave the stored records as they were.
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::Coach;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut coach = Coach::from_env().await?;
//!     let plan = coach.generate_plan().await?;
//!     println!("Daily calories: {}", plan.daily_plan.calorie_target);
//!     Ok(())
//! }
//! ```

mod coach;
mod config;
mod error;

pub use coach::{AnalysisOutcome, Coach, PendingAnalysis};
pub use config::{CoachConfig, DEFAULT_DATABASE_URL};
pub use error::OrchestratorError;

// Re-export commonly used types
pub use coach_core::{CoachError, PhotoImage};
pub use coach_services::{ServiceConfig, MEAL_ANALYSIS_FALLBACK, PLAN_FALLBACK};
pub use coach_state::{AnalysisTicket, BookmarkOutcome, Completion, ProfileChange};
