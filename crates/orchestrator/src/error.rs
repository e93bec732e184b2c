//! Error types for coach operations.

use coach_core::CoachError;
use coach_state::StateError;
use thiserror::Error;

/// Errors that can occur while running a coach action.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Plan generation failed. The previous plan is kept.
    #[error("{message}")]
    Plan {
        /// User-facing message.
        message: String,
        #[source]
        source: CoachError,
    },

    /// Meal analysis failed. The capture is ready for another photo.
    #[error("{message}")]
    MealAnalysis {
        /// User-facing message.
        message: String,
        #[source]
        source: CoachError,
    },

    /// Reading or writing state failed, or the action was not allowed.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Component setup failed.
    #[error("setup failed: {0}")]
    Setup(#[from] CoachError),
}

impl OrchestratorError {
    /// Wrap a plan failure with its user-facing message.
    pub fn plan(source: CoachError, fallback: &str) -> Self {
        Self::Plan {
            message: source.user_message(fallback),
            source,
        }
    }

    /// Wrap an analysis failure with its user-facing message.
    pub fn meal_analysis(source: CoachError, fallback: &str) -> Self {
        Self::MealAnalysis {
            message: source.user_message(fallback),
            source,
        }
    }

    /// The message to show the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// The pipeline error behind this failure, if any.
    pub fn coach_error(&self) -> Option<&CoachError> {
        match self {
            Self::Plan { source, .. } | Self::MealAnalysis { source, .. } => Some(source),
            Self::State(StateError::Invalid(source)) | Self::Setup(source) => Some(source),
            Self::State(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_services::PLAN_FALLBACK;

    #[test]
    fn test_plan_error_uses_fallback_for_empty_message() {
        let err = OrchestratorError::plan(
            CoachError::Service {
                status: Some(500),
                message: String::new(),
            },
            PLAN_FALLBACK,
        );
        assert_eq!(
            err.user_message(),
            "Failed to generate plan. Please check your connection."
        );
        assert!(err.coach_error().is_some());
    }

    #[test]
    fn test_plan_error_keeps_service_message() {
        let err = OrchestratorError::plan(
            CoachError::Transient("429 RESOURCE_EXHAUSTED: slow down".to_string()),
            PLAN_FALLBACK,
        );
        assert_eq!(err.user_message(), "429 RESOURCE_EXHAUSTED: slow down");
    }

    #[test]
    fn test_state_error_message() {
        let err = OrchestratorError::from(StateError::UnknownField("shoe".to_string()));
        assert_eq!(err.user_message(), "state error: unknown profile field: shoe");
        assert!(err.coach_error().is_none());
    }
}
