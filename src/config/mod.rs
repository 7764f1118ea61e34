//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `DOCQUEST` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use docquest::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("History log at {}", config.storage.history_path.display());
//! ```

mod ai;
mod error;
mod logging;
mod storage;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// Every section has defaults except the AI key, which `validate` requires.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Chat-completion provider used by both agents
    #[serde(default)]
    pub ai: AiConfig,

    /// Case catalog and history log locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Tracing output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DOCQUEST` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `DOCQUEST__AI__API_KEY=sk-...` -> `ai.api_key = sk-...`
    /// - `DOCQUEST__STORAGE__HISTORY_PATH=...` -> `storage.history_path = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DOCQUEST")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "DOCQUEST__AI__API_KEY",
        "DOCQUEST__AI__MODEL",
        "DOCQUEST__AI__TIMEOUT_SECS",
        "DOCQUEST__STORAGE__CATALOG_PATH",
        "DOCQUEST__STORAGE__HISTORY_PATH",
        "DOCQUEST__LOGGING__JSON",
    ];

    fn set_minimal_env() {
        env::set_var("DOCQUEST__AI__API_KEY", "sk-test-key");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        let key = config.ai.api_key.as_ref().unwrap();
        assert_eq!(key.expose_secret(), "sk-test-key");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert!(config.ai.api_key.is_none());
        assert_eq!(config.storage.history_path, PathBuf::from("data/history.jsonl"));
        assert!(!config.logging.json);
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("AI__API_KEY"))
        );
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("DOCQUEST__AI__MODEL", "llama-3.1-8b");
        env::set_var("DOCQUEST__AI__TIMEOUT_SECS", "15");
        env::set_var("DOCQUEST__STORAGE__CATALOG_PATH", "/srv/docquest/cases.yaml");
        env::set_var("DOCQUEST__STORAGE__HISTORY_PATH", "/srv/docquest/history.jsonl");
        env::set_var("DOCQUEST__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.model, "llama-3.1-8b");
        assert_eq!(config.ai.timeout_secs, 15);
        assert_eq!(
            config.storage.catalog_path,
            PathBuf::from("/srv/docquest/cases.yaml")
        );
        assert_eq!(
            config.storage.history_path,
            PathBuf::from("/srv/docquest/history.jsonl")
        );
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }
}
