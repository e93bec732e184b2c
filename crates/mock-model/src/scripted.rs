//! Scripted model implementation - replays queued outcomes in order.

use std::collections::VecDeque;
use std::sync::Mutex;

use coach_core::{async_trait, CoachError, GenerationRequest, GenerativeModel};

/// A model that answers from a queue of scripted outcomes.
///
/// Each call pops the next outcome. Once the queue is drained every further
/// call fails with a non-transient service error, so an unexpected extra
/// attempt shows up in the test instead of looping. All requests are
/// recorded for later inspection.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    outcomes: Mutex<VecDeque<Result<String, CoachError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedModel {
    /// Create a model with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn then_ok(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn then_err(self, error: CoachError) -> Self {
        self.push(Err(error));
        self
    }

    /// Queue an outcome on a shared model.
    pub fn push(&self, outcome: Result<String, CoachError>) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(outcome);
        }
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Copies of every request received, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.outcomes.lock().map(|o| o.len()).unwrap_or(0)
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoachError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let next = self
            .outcomes
            .lock()
            .map_err(|_| CoachError::Service {
                status: None,
                message: "script lock poisoned".to_string(),
            })?
            .pop_front();

        next.unwrap_or_else(|| {
            Err(CoachError::Service {
                status: None,
                message: "script exhausted".to_string(),
            })
        })
    }

    fn name(&self) -> &str {
        "ScriptedModel"
    }
}
