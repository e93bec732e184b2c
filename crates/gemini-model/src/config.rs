//! Configuration for GeminiModel.

use coach_core::CoachError;
use std::env;

/// Default Gemini API URL.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for GeminiModel.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Gemini API URL (without the version path).
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Temperature for generation (0.0 - 2.0). Model default when unset.
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            temperature: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `GEMINI_API_KEY` - API key (`API_KEY` is accepted as a fallback)
    ///
    /// Optional environment variables:
    /// - `GEMINI_API_URL` - API URL (default: https://generativelanguage.googleapis.com)
    /// - `GEMINI_TEMPERATURE` - Temperature (default: model default)
    /// - `GEMINI_TIMEOUT_SECS` - Request timeout (default: 60)
    pub fn from_env() -> Result<Self, CoachError> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .map_err(|_| CoachError::Configuration("GEMINI_API_KEY not set".to_string()))?;

        let api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let temperature = env::var("GEMINI_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok());

        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            api_url,
            api_key,
            temperature,
            timeout_secs,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> GeminiConfigBuilder {
        GeminiConfigBuilder::default()
    }
}

/// Builder for GeminiConfig.
#[derive(Debug, Default)]
pub struct GeminiConfigBuilder {
    config: GeminiConfig,
}

impl GeminiConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the request timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GeminiConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeminiConfig::default();

        assert_eq!(config.api_url, "https://generativelanguage.googleapis.com");
        assert!(config.api_key.is_empty());
        assert!(config.temperature.is_none());
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_builder_all_options() {
        let config = GeminiConfig::builder()
            .api_key("my-key")
            .api_url("http://localhost:9999")
            .temperature(0.4)
            .timeout_secs(5)
            .build();

        assert_eq!(config.api_key, "my-key");
        assert_eq!(config.api_url, "http://localhost:9999");
        assert_eq!(config.temperature, Some(0.4));
        assert_eq!(config.timeout_secs, 5);
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_gemini_vars() {
            std::env::remove_var("GEMINI_API_KEY");
            std::env::remove_var("API_KEY");
            std::env::remove_var("GEMINI_API_URL");
            std::env::remove_var("GEMINI_TEMPERATURE");
            std::env::remove_var("GEMINI_TIMEOUT_SECS");
        }

        // Scenario 1: Missing API key should error
        clear_all_gemini_vars();
        match GeminiConfig::from_env() {
            Err(CoachError::Configuration(msg)) => assert!(msg.contains("GEMINI_API_KEY")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }

        // Scenario 2: Fallback key name
        clear_all_gemini_vars();
        std::env::set_var("API_KEY", "fallback-key");
        let config = GeminiConfig::from_env().unwrap();
        assert_eq!(config.api_key, "fallback-key");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        // Scenario 3: All vars set
        clear_all_gemini_vars();
        std::env::set_var("GEMINI_API_KEY", "primary-key");
        std::env::set_var("API_KEY", "fallback-key");
        std::env::set_var("GEMINI_API_URL", "http://127.0.0.1:8080");
        std::env::set_var("GEMINI_TEMPERATURE", "0.2");
        std::env::set_var("GEMINI_TIMEOUT_SECS", "15");

        let config = GeminiConfig::from_env().unwrap();
        assert_eq!(config.api_key, "primary-key");
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.timeout_secs, 15);

        clear_all_gemini_vars();
    }
}
