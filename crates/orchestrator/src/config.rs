//! Configuration for the coach.

use std::env;

use coach_services::ServiceConfig;

/// Default location of the durable store.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/coach.db?mode=rwc";

/// Coach configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachConfig {
    /// SQLite URL of the durable store.
    pub database_url: String,

    /// Model and retry settings.
    pub services: ServiceConfig,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            services: ServiceConfig::default(),
        }
    }
}

impl CoachConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `COACH_DATABASE_URL` - Store location (default: sqlite:data/coach.db?mode=rwc)
    /// - everything read by [`ServiceConfig::from_env`]
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("COACH_DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            services: ServiceConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoachConfig::default();
        assert_eq!(config.database_url, "sqlite:data/coach.db?mode=rwc");
        assert_eq!(config.services, ServiceConfig::default());
    }

    #[test]
    fn test_from_env_database_url() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        std::env::remove_var("COACH_DATABASE_URL");
        assert_eq!(CoachConfig::from_env().database_url, DEFAULT_DATABASE_URL);

        std::env::set_var("COACH_DATABASE_URL", "sqlite::memory:");
        assert_eq!(CoachConfig::from_env().database_url, "sqlite::memory:");

        std::env::remove_var("COACH_DATABASE_URL");
    }
}
