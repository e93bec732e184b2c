//! Mock generative models for the plan and meal pipeline.
//!
//! This crate provides mock implementations of the `GenerativeModel` trait:
//! - `StaticModel` - Always answers with the same text
//! - `ScriptedModel` - Answers from a queue of responses and errors, recording requests
//! - `DelayedModel` - Answers late, counting calls that started and finished
//!
//! For real AI processing, use the `gemini-model` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_model::{CoachError, GenerationRequest, GenerativeModel, Schema, ScriptedModel};
//!
//! #[tokio::main]
//! async fn main() {
//!     let model = ScriptedModel::new()
//!         .then_err(CoachError::Transient("429 quota".to_string()))
//!         .then_ok("\"done\"");
//!
//!     let request = GenerationRequest::text("test-model", "hello", Schema::string());
//!     assert!(model.generate(&request).await.is_err());
//!     assert_eq!(model.generate(&request).await.unwrap(), "\"done\"");
//!     assert_eq!(model.call_count(), 2);
//! }
//! ```

mod delayed;
mod scripted;
mod static_model;

// Re-export coach-core types for convenience
pub use coach_core::{async_trait, CoachError, GenerationRequest, GenerativeModel, Schema};

// Export mock implementations
pub use delayed::DelayedModel;
pub use scripted::ScriptedModel;
pub use static_model::StaticModel;
