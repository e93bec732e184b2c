//! Plan synthesis and meal analysis on top of a [`GenerativeModel`].
//!
//! - [`RequestClient`] executes one structured request, retrying transient
//!   failures with exponential backoff and decoding the response against
//!   the caller's schema.
//! - [`PlanService`] turns a [`UserProfile`] into a [`CoachResponse`].
//! - [`MealAnalysisService`] turns a photo into a [`MealAnalysisResponse`].
//!
//! Neither service touches application state; applying a result is the
//! reconciler's job.
//!
//! [`GenerativeModel`]: coach_core::GenerativeModel
//! [`UserProfile`]: coach_core::UserProfile
//! [`CoachResponse`]: coach_core::CoachResponse
//! [`MealAnalysisResponse`]: coach_core::MealAnalysisResponse

mod client;
mod config;
mod meal;
mod plan;
mod retry;

pub use client::RequestClient;
pub use config::{ServiceConfig, ServiceConfigBuilder, DEFAULT_MODEL};
pub use meal::{MealAnalysisService, MEAL_ANALYSIS_FALLBACK, MEAL_PROMPT};
pub use plan::{PlanService, PLAN_FALLBACK};
pub use retry::RetryPolicy;
