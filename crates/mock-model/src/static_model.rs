//! Static model implementation - always answers with the same text.

use coach_core::{async_trait, CoachError, GenerationRequest, GenerativeModel};

/// A model that returns the same response text for every request.
///
/// Useful for testing the decode and reconcile steps without any AI processing.
#[derive(Debug, Clone)]
pub struct StaticModel {
    text: String,
}

impl StaticModel {
    /// Create a model that always returns `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl GenerativeModel for StaticModel {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, CoachError> {
        Ok(self.text.clone())
    }

    fn name(&self) -> &str {
        "StaticModel"
    }
}
