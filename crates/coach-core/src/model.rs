//! The generative model trait and its request type.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{CoachError, Result};
use crate::schema::Schema;

/// MIME type assumed for captured photos.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// An encoded still image sent inline with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoImage {
    /// MIME type, e.g. `image/jpeg`.
    pub mime_type: String,
    /// Raw encoded image bytes.
    pub bytes: Vec<u8>,
}

impl PhotoImage {
    /// Create an image, rejecting empty data and non-image MIME types.
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let mime_type = mime_type.into();
        if bytes.is_empty() {
            return Err(CoachError::RequestConstruction(
                "missing image data".to_string(),
            ));
        }
        if !mime_type.starts_with("image/") {
            return Err(CoachError::RequestConstruction(format!(
                "unsupported image type: {}",
                mime_type
            )));
        }
        Ok(Self { mime_type, bytes })
    }

    /// Create a JPEG image.
    pub fn jpeg(bytes: Vec<u8>) -> Result<Self> {
        Self::new(DEFAULT_IMAGE_MIME, bytes)
    }

    /// Base64 encoding of the bytes, as carried in inline request data.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:` URL for storing alongside a logged meal.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// A structured-output request to a generative model.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Model identifier, e.g. `gemini-3-flash-preview`.
    pub model: String,
    /// Instruction prompt.
    pub prompt: String,
    /// Optional inline image.
    pub image: Option<PhotoImage>,
    /// Shape the response text must conform to.
    pub schema: Schema,
}

impl GenerationRequest {
    /// Create a text-only request.
    pub fn text(model: impl Into<String>, prompt: impl Into<String>, schema: Schema) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            image: None,
            schema,
        }
    }

    /// Attach an inline image.
    pub fn with_image(mut self, image: PhotoImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// A generative AI backend that returns structured text for a request.
///
/// Implementations return the raw response text; decoding against the
/// schema happens in [`crate::decode`]. Failures must be reported with
/// the [`CoachError`] variant that matches their cause, so the caller can
/// decide whether to retry.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Execute one request. No retries.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Get a human-readable name for this backend.
    fn name(&self) -> &str;
}
