//! Configuration for the plan and meal services.

use std::env;
use std::time::Duration;

use crate::retry::{RetryPolicy, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_RETRIES};

/// Model used for both plan synthesis and meal analysis by default.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Model identifier for plan synthesis.
    pub plan_model: String,

    /// Model identifier for meal photo analysis.
    pub meal_model: String,

    /// Retries after the first attempt on transient failures.
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds. Doubles per retry.
    pub initial_backoff_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            plan_model: DEFAULT_MODEL.to_string(),
            meal_model: DEFAULT_MODEL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: DEFAULT_INITIAL_DELAY.as_millis() as u64,
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `COACH_PLAN_MODEL` - Plan model (default: gemini-3-flash-preview)
    /// - `COACH_MEAL_MODEL` - Meal analysis model (default: gemini-3-flash-preview)
    /// - `COACH_MAX_RETRIES` - Retries on transient failures (default: 2)
    /// - `COACH_INITIAL_BACKOFF_MS` - First retry delay (default: 2000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            plan_model: env::var("COACH_PLAN_MODEL").unwrap_or(defaults.plan_model),
            meal_model: env::var("COACH_MEAL_MODEL").unwrap_or(defaults.meal_model),
            max_retries: env::var("COACH_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
            initial_backoff_ms: env::var("COACH_INITIAL_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.initial_backoff_ms),
        }
    }

    /// Create a new config builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// The retry policy these settings describe.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.initial_backoff_ms),
        )
    }
}

/// Builder for ServiceConfig.
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Set the plan model.
    pub fn plan_model(mut self, model: impl Into<String>) -> Self {
        self.config.plan_model = model.into();
        self
    }

    /// Set the meal analysis model.
    pub fn meal_model(mut self, model: impl Into<String>) -> Self {
        self.config.meal_model = model.into();
        self
    }

    /// Set the retry budget.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the first retry delay.
    pub fn initial_backoff_ms(mut self, millis: u64) -> Self {
        self.config.initial_backoff_ms = millis;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ServiceConfig {
        self.config
    }
}
