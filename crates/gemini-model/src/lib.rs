//! Google Gemini backend for the nutrition coach.
//!
//! This crate implements [`GenerativeModel`] on top of the Gemini
//! `generateContent` endpoint, sending the request schema as
//! `responseSchema` so the model answers with JSON.
//!
//! # Failure classification
//!
//! - HTTP 429 and the `RESOURCE_EXHAUSTED` status are reported as
//!   [`CoachError::Transient`]
//! - Transport failures (connect, timeout) are reported as transient RPC failures
//! - Any other error response is classified by its message, falling back to
//!   [`CoachError::Service`]
//!
//! # Usage
//!
//! ```rust,no_run
//! use gemini_model::GeminiModel;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = GeminiModel::from_env()?;
//!     // Pass the model to the request client...
//!     Ok(())
//! }
//! ```

mod api_types;
mod config;
mod model;

pub use config::{GeminiConfig, GeminiConfigBuilder};
pub use model::GeminiModel;

// Re-export coach-core types for convenience
pub use coach_core::{CoachError, GenerationRequest, GenerativeModel};
