//! Configuration manager - main API for config operations

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult, LogLevel};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Main configuration manager
///
/// Owns the config directory and everything stored in it: `config.toml`, its backup and the
/// resume position file.
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the default config directory
    ///
    /// - Linux: `~/.config/vidshell/`
    /// - macOS: `~/Library/Application Support/vidshell/`
    /// - Windows: `%APPDATA%\vidshell\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Self::with_directory(config_dir)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let config_path = config_dir.join("config.toml");
        let persistence = ConfigPersistence::new(config_path);

        Ok(Self {
            persistence,
            config_dir,
        })
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "vidshell")
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
        self.config_dir.join("config.toml")
    }

    /// Resolves `app.resume_file` against the config directory
    pub fn resume_file_path(&self, config: &Config) -> PathBuf {
        if config.app.resume_file.is_absolute() {
            config.app.resume_file.clone()
        } else {
            self.config_dir.join(&config.app.resume_file)
        }
    }

    /// Loads the configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file is corrupted, returns an error.
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

    /// Saves the configuration to file
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads the current config, applies `update_fn` and saves the result
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use vidshell_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.player.right_key_speed = 3.0;
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

    /// Generates a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.persistence.generate_default()?;
        Ok(true)
    }

    /// Overwrites the config file with default values
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Validates the current configuration file
    ///
    /// Returns all validation errors found, or Ok if valid.
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the config and applies `VIDSHELL_SECTION_FIELD` environment overrides
    ///
    /// Recognised: `VIDSHELL_PLAYER_VOLUME`, `VIDSHELL_PLAYER_PLAYBACK_RATE`,
    /// `VIDSHELL_APP_LOG_LEVEL`. Values that do not parse are ignored.
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;

        if let Ok(volume) = std::env::var("VIDSHELL_PLAYER_VOLUME") {
            match volume.parse::<u8>() {
                Ok(v) => config.player.volume = v,
                Err(_) => log::warn!("Ignoring VIDSHELL_PLAYER_VOLUME={}", volume),
            }
        }

        if let Ok(rate) = std::env::var("VIDSHELL_PLAYER_PLAYBACK_RATE") {
            match rate.parse::<f64>() {
                Ok(r) => config.player.playback_rate = r,
                Err(_) => log::warn!("Ignoring VIDSHELL_PLAYER_PLAYBACK_RATE={}", rate),
            }
        }

        if let Ok(level) = std::env::var("VIDSHELL_APP_LOG_LEVEL") {
            match level.parse::<LogLevel>() {
                Ok(l) => config.app.log_level = l,
                Err(e) => log::warn!("Ignoring VIDSHELL_APP_LOG_LEVEL: {}", e),
            }
        }

        if let Err(errors) = config.validate() {
            log::warn!(
                "Config validation warnings after env overrides: {:?}",
                errors
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_manager() -> (TempDir, ConfigManager) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())
            .expect("Failed to create manager");
        (temp_dir, manager)
    }

    #[test]
    fn test_new_manager() {
        let result = ConfigManager::new();
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let (_temp_dir, manager) = setup_test_manager();
        let config = manager.load_or_default();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let (_temp_dir, manager) = setup_test_manager();

        let mut config = Config::default();
        config.player.left_key_speed = 1.5;

        manager.save(&config).expect("Should save config");
        let loaded = manager.load().expect("Should load config");

        assert_eq!(loaded.player.left_key_speed, 1.5);
    }

    #[test]
    fn test_update() {
        let (_temp_dir, manager) = setup_test_manager();
        manager.save(&Config::default()).expect("Should save");

        manager
            .update(|config| {
                config.app.last_folder = Some(PathBuf::from("/videos"));
            })
            .expect("Should update");

        let loaded = manager.load().expect("Should load");
        assert_eq!(loaded.app.last_folder, Some(PathBuf::from("/videos")));
    }

    #[test]
    fn test_update_rejects_invalid_value() {
        let (_temp_dir, manager) = setup_test_manager();
        manager.save(&Config::default()).expect("Should save");

        let result = manager.update(|config| config.player.right_key_speed = 0.0);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let loaded = manager.load().expect("Should load");
        assert_eq!(loaded.player.right_key_speed, 2.0);
    }

    #[test]
    fn test_initialize_creates_file() {
        let (_temp_dir, manager) = setup_test_manager();

        let created = manager.initialize().expect("Should initialize");
        assert!(created);
        assert!(manager.config_path().exists());
    }

    #[test]
    fn test_initialize_with_existing_file() {
        let (_temp_dir, manager) = setup_test_manager();

        manager.save(&Config::default()).expect("Should save");

        let created = manager.initialize().expect("Should initialize");
        assert!(!created);
    }

    #[test]
    fn test_reset() {
        let (_temp_dir, manager) = setup_test_manager();

        let mut config = Config::default();
        config.player.volume = 99;
        manager.save(&config).expect("Should save");

        manager.reset().expect("Should reset");

        let loaded = manager.load().expect("Should load");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_validate_valid_config() {
        let (_temp_dir, manager) = setup_test_manager();
        manager.save(&Config::default()).expect("Should save");

        let errors = manager.validate().expect("Should validate");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_reports_hand_edited_errors() {
        let (_temp_dir, manager) = setup_test_manager();
        std::fs::write(manager.config_path(), "[player]\ntap_seek_secs = 0\n")
            .expect("Should write");

        let errors = manager.validate().expect("Should validate");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("player.tap_seek_secs"));
    }

    #[test]
    fn test_resume_file_relative_to_config_dir() {
        let (temp_dir, manager) = setup_test_manager();
        let config = Config::default();
        assert_eq!(
            manager.resume_file_path(&config),
            temp_dir.path().join("resume.json")
        );
    }

    #[test]
    fn test_resume_file_absolute_kept() {
        let (_temp_dir, manager) = setup_test_manager();
        let mut config = Config::default();
        config.app.resume_file = PathBuf::from("/var/lib/vidshell/positions.json");
        assert_eq!(
            manager.resume_file_path(&config),
            PathBuf::from("/var/lib/vidshell/positions.json")
        );
    }

    #[test]
    fn test_env_overrides() {
        let (_temp_dir, manager) = setup_test_manager();
        manager.save(&Config::default()).expect("Should save");

        std::env::set_var("VIDSHELL_PLAYER_VOLUME", "85");
        std::env::set_var("VIDSHELL_APP_LOG_LEVEL", "debug");
        std::env::set_var("VIDSHELL_PLAYER_PLAYBACK_RATE", "fast");

        let config = manager
            .load_with_env_overrides()
            .expect("Should load with overrides");

        std::env::remove_var("VIDSHELL_PLAYER_VOLUME");
        std::env::remove_var("VIDSHELL_APP_LOG_LEVEL");
        std::env::remove_var("VIDSHELL_PLAYER_PLAYBACK_RATE");

        assert_eq!(config.player.volume, 85);
        assert_eq!(config.app.log_level, LogLevel::Debug);
        assert_eq!(config.player.playback_rate, 1.0);
    }

    #[test]
    fn test_config_file_path() {
        let (_temp_dir, manager) = setup_test_manager();
        assert!(manager.config_path().ends_with("config.toml"));
    }
}
