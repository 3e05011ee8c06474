//! # warden-config
//!
//! Layered configuration loading for Warden using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`WARDEN_*` prefix, `__` as separator)
//! 2. Project-level `.warden/config.toml`
//! 3. User-level `~/.config/warden/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `WARDEN_DATABASE__PATH` -> `database.path`,
//! `WARDEN_ENGINE__BULK_CONCURRENCY` -> `engine.bulk_concurrency`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use warden_config::WardenConfig;
//!
//! let config = WardenConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.database.path);
//! ```

mod database;
mod engine;
mod error;
mod general;

pub use database::DatabaseConfig;
pub use engine::EngineConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the project-local state directory.
pub const PROJECT_DIR: &str = ".warden";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WardenConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl WardenConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` when a source cannot be parsed and
    /// `ConfigError::InvalidValue` when a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("WARDEN_").split("__"))
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::invalid("database.path", "must not be empty"));
        }
        if self.engine.bulk_concurrency == 0 {
            return Err(ConfigError::invalid(
                "engine.bulk_concurrency",
                "must be at least 1",
            ));
        }
        if self.engine.recent_window_days == 0 {
            return Err(ConfigError::invalid(
                "engine.recent_window_days",
                "must be at least 1",
            ));
        }
        if self.engine.system_actor.trim().is_empty() {
            return Err(ConfigError::invalid(
                "engine.system_actor",
                "must not be empty",
            ));
        }
        if self.engine.default_severity.trim().is_empty() {
            return Err(ConfigError::invalid(
                "engine.default_severity",
                "must not be empty",
            ));
        }
        if self.general.default_limit == 0 {
            return Err(ConfigError::invalid(
                "general.default_limit",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("warden").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = WardenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.default_limit, 50);
        assert_eq!(config.database.path, ".warden/warden.db");
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut config = WardenConfig::default();
        config.engine.bulk_concurrency = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("engine.bulk_concurrency"));
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut config = WardenConfig::default();
        config.engine.recent_window_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_actor_is_rejected() {
        let mut config = WardenConfig::default();
        config.engine.system_actor = "  ".into();
        assert!(config.validate().is_err());
    }
}
