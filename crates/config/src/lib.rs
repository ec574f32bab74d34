//! Museu Literário client configuration
//!
//! Settings live in a single TOML file in the platform config directory.
//! Each section is a type implementing `ConfigSection`, so it validates and
//! merges itself.
//!
//! - **Graceful degradation**: invalid values are reported, never panicked on
//! - **Atomic writes**: the file is replaced via a temp file and rename
//! - **Env overrides**: `MUSEU_*` variables win over the file
//!
//! # Example
//!
//! ```rust
//! use museu_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Backend: {}", config.api.base_url);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Config sections
mod api_config;
pub mod app_config;
mod sync_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use validation::{ConfigSection, Validator};

// Re-export config sections
pub use api_config::ApiConfig;
pub use app_config::{AppConfig, LogLevel};
pub use sync_config::SyncSettings;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Backend connection settings
    pub api: ApiConfig,

    /// Favorite/status synchronization settings
    pub sync: SyncSettings,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.api.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.sync.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    ///
    /// Override chain: defaults < file < env vars < CLI args
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.api.merge(other.api);
        self.sync.merge(other.sync);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            api: ApiConfig::default(),
            sync: SyncSettings::default(),
        }
    }
}
