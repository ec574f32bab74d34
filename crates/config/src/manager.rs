//! Configuration manager - main API for config operations

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.toml";

/// Main configuration manager
///
/// Owns the config directory and resolves paths relative to it.
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the default config directory
    ///
    /// - Linux: `~/.config/museu/`
    /// - macOS: `~/Library/Application Support/museu/`
    /// - Windows: `%APPDATA%\museu\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Self::with_directory(config_dir)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let persistence = ConfigPersistence::new(config_dir.join(CONFIG_FILE));

        Ok(Self {
            persistence,
            config_dir,
        })
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "museu")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            })
    }

    /// Returns the config directory path
    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Resolves the session file, relative paths being under the config dir
    pub fn session_path(&self, config: &Config) -> PathBuf {
        if config.app.session_file.is_absolute() {
            config.app.session_file.clone()
        } else {
            self.config_dir.join(&config.app.session_file)
        }
    }

    /// Loads the configuration from file, or the defaults if there is none
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Validates and saves the configuration atomically
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads, applies `update_fn`, and saves
    ///
    /// ```rust,no_run
    /// # use museu_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.api.base_url = "https://museu.example.org".to_string();
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default config file if none exists
    ///
    /// Returns Ok(true) if a new file was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.persistence.write_default()?;
        Ok(true)
    }

    /// Overwrites the config file with defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Validates the current configuration file
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the file and applies `MUSEU_*` environment overrides
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_overrides(&mut config, |name| std::env::var(name).ok())?;

        if let Err(errors) = config.validate() {
            log::warn!(
                "Config validation warnings after env overrides: {:?}",
                errors
            );
        }

        Ok(config)
    }
}

/// Applies overrides from `lookup` (normally the process environment)
pub(crate) fn apply_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    fn parsed<T: std::str::FromStr>(variable: &str, value: String) -> ConfigResult<T> {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidOverride {
                variable: variable.to_string(),
                value,
            })
    }

    if let Some(url) = lookup("MUSEU_API_BASE_URL") {
        log::info!("Backend URL override: {}", url);
        config.api.base_url = url;
    }

    if let Some(value) = lookup("MUSEU_API_TIMEOUT_SECS") {
        config.api.request_timeout_secs = parsed("MUSEU_API_TIMEOUT_SECS", value)?;
    }

    if let Some(value) = lookup("MUSEU_SYNC_MUTATION_TIMEOUT_SECS") {
        config.sync.mutation_timeout_secs = parsed("MUSEU_SYNC_MUTATION_TIMEOUT_SECS", value)?;
    }

    if let Some(value) = lookup("MUSEU_APP_LOG_LEVEL") {
        config.app.log_level = parsed("MUSEU_APP_LOG_LEVEL", value)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogLevel;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn setup_test_manager() -> (TempDir, ConfigManager) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())
            .expect("Failed to create manager");
        (temp_dir, manager)
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let (_temp_dir, manager) = setup_test_manager();
        assert_eq!(manager.load_or_default(), Config::default());
    }

    #[test]
    fn test_update() {
        let (_temp_dir, manager) = setup_test_manager();
        manager.save(&Config::default()).expect("Should save");

        manager
            .update(|config| config.sync.mutation_timeout_secs = 20)
            .expect("Should update");

        let loaded = manager.load().expect("Should load");
        assert_eq!(loaded.sync.mutation_timeout_secs, 20);
    }

    #[test]
    fn test_initialize_only_once() {
        let (_temp_dir, manager) = setup_test_manager();

        assert!(manager.initialize().expect("Should initialize"));
        assert!(manager.config_path().exists());
        assert!(!manager.initialize().expect("Should initialize"));
    }

    #[test]
    fn test_session_path_resolution() {
        let (temp_dir, manager) = setup_test_manager();
        let mut config = Config::default();

        assert_eq!(
            manager.session_path(&config),
            temp_dir.path().join("session.json")
        );

        let absolute = temp_dir.path().join("elsewhere").join("s.json");
        config.app.session_file = absolute.clone();
        assert_eq!(manager.session_path(&config), absolute);
    }

    #[test]
    fn test_env_overrides_applied() {
        let mut config = Config::default();
        apply_overrides(
            &mut config,
            env(&[
                ("MUSEU_API_BASE_URL", "https://museu.example.org"),
                ("MUSEU_API_TIMEOUT_SECS", "30"),
                ("MUSEU_SYNC_MUTATION_TIMEOUT_SECS", " 5 "),
                ("MUSEU_APP_LOG_LEVEL", "debug"),
            ]),
        )
        .expect("Overrides should apply");

        assert_eq!(config.api.base_url, "https://museu.example.org");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.sync.mutation_timeout_secs, 5);
        assert_eq!(config.app.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = Config::default();
        let result = apply_overrides(&mut config, env(&[("MUSEU_API_TIMEOUT_SECS", "soon")]));

        assert!(matches!(result, Err(ConfigError::InvalidOverride { .. })));
        assert_eq!(config.api.request_timeout_secs, 15);
    }

    #[test]
    fn test_config_file_path() {
        let (_temp_dir, manager) = setup_test_manager();
        assert!(manager.config_path().ends_with("config.toml"));
    }
}
