//! GeminiModel implementation using the Generative Language API.

use std::time::Duration;

use coach_core::{async_trait, CoachError, GenerationRequest, GenerativeModel};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::api_types::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use crate::config::GeminiConfig;

/// Canonical status Gemini reports for rate limiting and quota exhaustion.
const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

/// A generative model backed by Google's Gemini API.
///
/// Each call is a single `generateContent` request; retrying is left to
/// the caller, which decides based on the returned error.
pub struct GeminiModel {
    client: Client,
    config: GeminiConfig,
}

impl GeminiModel {
    /// Create a new GeminiModel with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self, CoachError> {
        if config.api_key.trim().is_empty() {
            return Err(CoachError::Configuration("Gemini API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                CoachError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!("GeminiModel initialized with endpoint: {}", config.api_url);

        Ok(Self { client, config })
    }

    /// Create a GeminiModel from environment variables.
    ///
    /// See [`GeminiConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, CoachError> {
        let config = GeminiConfig::from_env()?;
        Self::new(config)
    }

    /// Get the configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            model
        )
    }
}

/// Build the request body. The image part, when present, precedes the prompt.
pub(crate) fn build_request(
    request: &GenerationRequest,
    temperature: Option<f32>,
) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(ref image) = request.image {
        parts.push(Part::inline(image.mime_type.clone(), image.to_base64()));
    }
    parts.push(Part::text(request.prompt.clone()));

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: request.schema.to_json(),
            temperature,
        },
    }
}

/// Map a non-success response to a [`CoachError`].
///
/// Rate limiting is recognized from the status code or the canonical error
/// status first; the message heuristic only applies when neither is present.
pub(crate) fn classify_error(status: StatusCode, body: &str) -> CoachError {
    let details = serde_json::from_str::<ApiError>(body).ok().map(|e| e.error);
    let message = details
        .as_ref()
        .map(|d| d.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    let canonical = details.as_ref().and_then(|d| d.status.as_deref());

    if status == StatusCode::TOO_MANY_REQUESTS || canonical == Some(RESOURCE_EXHAUSTED) {
        return CoachError::Transient(format!("429 {}: {}", RESOURCE_EXHAUSTED, message));
    }

    match CoachError::from_service_message(message) {
        CoachError::Service { message, .. } => CoachError::Service {
            status: Some(status.as_u16()),
            message: format!("Gemini API error ({}): {}", status.as_u16(), message),
        },
        transient => transient,
    }
}

/// Map a transport failure to a [`CoachError`].
fn classify_transport(error: &reqwest::Error) -> CoachError {
    if error.is_connect() || error.is_timeout() {
        CoachError::Transient(format!("Rpc failed: {}", error))
    } else {
        CoachError::from_service_message(format!("Failed to send request: {}", error))
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoachError> {
        let url = self.endpoint(&request.model);
        let body = build_request(request, self.config.temperature);

        debug!(
            "Sending request to Gemini model {} (image: {})",
            request.model,
            request.image.is_some()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| classify_transport(&e))?;

        if !status.is_success() {
            warn!("Gemini API returned {}", status.as_u16());
            return Err(classify_error(status, &text));
        }

        let completion: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| CoachError::schema(format!("Failed to parse Gemini response: {}", e)))?;

        if let Some(usage) = &completion.usage_metadata {
            debug!(
                "Token usage - prompt: {:?}, candidates: {:?}, total: {:?}",
                usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
            );
        }

        completion.text().ok_or_else(|| {
            CoachError::schema(format!(
                "Gemini response contained no text (finish reason: {})",
                completion.finish_reason().unwrap_or("unknown")
            ))
        })
    }

    fn name(&self) -> &str {
        "GeminiModel"
    }
}
