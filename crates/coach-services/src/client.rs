//! Structured request execution with retry and schema enforcement.

use std::sync::Arc;

use coach_core::{
    decode, CoachError, GenerationRequest, GenerativeModel, PhotoImage, StructuredResponse,
};
use tracing::debug;

use crate::retry::RetryPolicy;

/// Executes structured-output requests against a [`GenerativeModel`].
///
/// Transient failures are retried per the [`RetryPolicy`]; the response
/// text is then decoded against `T::schema()`. Nothing else is touched.
#[derive(Clone)]
pub struct RequestClient {
    model: Arc<dyn GenerativeModel>,
    retry: RetryPolicy,
}

impl RequestClient {
    /// Create a client with the default retry policy.
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self::with_policy(model, RetryPolicy::default())
    }

    /// Create a client with a custom retry policy.
    pub fn with_policy(model: Arc<dyn GenerativeModel>, retry: RetryPolicy) -> Self {
        Self { model, retry }
    }

    /// The retry policy in use.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Name of the underlying model backend.
    pub fn backend_name(&self) -> &str {
        self.model.name()
    }

    /// Send `prompt` (and `image`, if any) to `model_id` and decode the
    /// result as `T`.
    pub async fn execute<T: StructuredResponse>(
        &self,
        model_id: &str,
        prompt: &str,
        image: Option<PhotoImage>,
    ) -> Result<T, CoachError> {
        if model_id.trim().is_empty() {
            return Err(CoachError::RequestConstruction(
                "model identifier is empty".to_string(),
            ));
        }

        let mut request = GenerationRequest::text(model_id, prompt, T::schema());
        if let Some(image) = image {
            request = request.with_image(image);
        }

        debug!(
            "Executing structured request on {} via {}",
            model_id,
            self.model.name()
        );

        let model = &self.model;
        let request = &request;
        let text = self.retry.run(move || model.generate(request)).await?;

        decode(&text)
    }
}

impl std::fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestClient")
            .field("model", &self.model.name())
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::MealAnalysisResponse;
    use mock_model::{ScriptedModel, StaticModel};
    use std::time::Duration;

    const MEAL: &str = r#"{"items":[{"name":"Rice","calories":200}],"totalCalories":200,"healthAlerts":["Starchy"],"coachVerdict":"Fine."}"#;

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_decodes() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_err(CoachError::from_service_message("Rpc failed: connection reset"))
                .then_ok(MEAL),
        );
        let client = RequestClient::new(model.clone());

        let start = tokio::time::Instant::now();
        let meal: MealAnalysisResponse = client.execute("m", "describe", None).await.unwrap();

        assert_eq!(meal.total_calories, 200.0);
        assert_eq!(model.call_count(), 2);
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_schema_violation_not_retried() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_ok(r#"{"items":[],"totalCalories":0,"healthAlerts":[]}"#)
                .then_ok(MEAL),
        );
        let client = RequestClient::new(model.clone());

        let err = client
            .execute::<MealAnalysisResponse>("m", "describe", None)
            .await
            .unwrap_err();

        assert!(err.is_schema_violation());
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_schema_and_image() {
        let model = Arc::new(ScriptedModel::new().then_ok(MEAL));
        let client = RequestClient::new(model.clone());
        let photo = PhotoImage::jpeg(vec![0xff, 0xd8, 0xff]).unwrap();

        let _: MealAnalysisResponse = client
            .execute("vision", "describe", Some(photo.clone()))
            .await
            .unwrap();

        let sent = &model.requests()[0];
        assert_eq!(sent.model, "vision");
        assert_eq!(sent.image.as_ref(), Some(&photo));
        assert_eq!(
            sent.schema.required_fields(),
            vec!["items", "totalCalories", "healthAlerts", "coachVerdict"]
        );
    }

    #[tokio::test]
    async fn test_empty_model_id_rejected_without_call() {
        let model = Arc::new(ScriptedModel::new().then_ok(MEAL));
        let client = RequestClient::new(model.clone());

        let err = client
            .execute::<MealAnalysisResponse>("  ", "describe", None)
            .await
            .unwrap_err();

        assert!(matches!(err, CoachError::RequestConstruction(_)));
        assert_eq!(model.call_count(), 0);
    }

    #[test]
    fn test_debug_shows_backend() {
        let client = RequestClient::new(Arc::new(StaticModel::new("")));
        assert_eq!(client.backend_name(), "StaticModel");
        assert!(format!("{:?}", client).contains("StaticModel"));
    }
}
