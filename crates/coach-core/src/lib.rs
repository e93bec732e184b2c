//! Core types and contracts for the nutrition coach.
//!
//! This crate holds everything the other crates agree on:
//!
//! - [`UserProfile`], [`LoggedMeal`], [`CoachResponse`] - The three durable records
//! - [`MealAnalysisResponse`] - The transient result of a photo analysis
//! - [`CoachError`] - Error taxonomy shared by the request pipeline
//! - [`Schema`] / [`StructuredResponse`] - Response contracts and the decode step
//! - [`GenerativeModel`] - The trait every AI backend implements
//!
//! # Example
//!
//! ```rust
//! use coach_core::{decode, CoachResponse};
//!
//! let text = r#"{"dailyPlan": {}}"#;
//! let result = decode::<CoachResponse>(text);
//! assert!(result.unwrap_err().is_schema_violation());
//! ```

mod error;
mod model;
mod portion;
mod prompt;
mod schema;
mod types;

pub use error::{is_transient_message, CoachError, Result};
pub use model::{GenerationRequest, GenerativeModel, PhotoImage, DEFAULT_IMAGE_MIME};
pub use portion::{round_half_up, scale_calories, PORTION_MAX, PORTION_MIN};
pub use prompt::hash_prompt;
pub use schema::{decode, Field, Schema, StructuredResponse};
pub use types::{
    ActivityLevel, BmiAnalysis, CoachResponse, DailyPlan, Ethnicity, FoodItem, Gender, Goal,
    HealthTips, Language, LoggedMeal, MealAnalysisResponse, MealItemRecognition, TipAnalysis,
    UserProfile, DEFAULT_HEIGHT_CM, DEFAULT_PACE, DEFAULT_WEIGHT_KG, DIETARY_PREFERENCES,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
